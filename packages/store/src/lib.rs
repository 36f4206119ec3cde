//! # Store crate — users and health logs
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Records and their JSON wire format |
//! | [`repo`] | The [`Store`] trait and [`StoreError`] |
//! | `memory` | [`MemoryStore`], a process-local backend for tests and database-less runs |
//! | `pg` | [`PgStore`], the PostgreSQL backend with embedded migrations |

pub mod models;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

mod pg;
pub use pg::PgStore;

pub use models::{
    normalize_email, AppointmentLog, DietLog, HealthLog, History, HistoryEntry, LogKind,
    MedicineLog, ReportLog, SymptomLog, User, WorkoutLog, APPOINTMENT_UPCOMING,
};
pub use repo::{Store, StoreError, StoreResult};
