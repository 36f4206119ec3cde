//! # Store — the persistence seam
//!
//! Handlers never talk to a database directly; everything goes through the [`Store`]
//! trait so the same request logic runs against PostgreSQL in production
//! ([`crate::PgStore`]) and an in-memory map in tests ([`crate::MemoryStore`]).
//!
//! Every read takes the owning user's id and filters by it. A record id alone is
//! never enough to reach another user's data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate email, second health
    /// log for the same day).
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Duplicate`] if the email is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Look up by email; the caller passes a normalised address.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert_symptom_log(&self, log: SymptomLog) -> StoreResult<SymptomLog>;
    async fn insert_medicine_log(&self, log: MedicineLog) -> StoreResult<MedicineLog>;
    async fn insert_report_log(&self, log: ReportLog) -> StoreResult<ReportLog>;
    async fn insert_diet_log(&self, log: DietLog) -> StoreResult<DietLog>;
    async fn insert_workout_log(&self, log: WorkoutLog) -> StoreResult<WorkoutLog>;

    /// All AI logs of a user, each list newest first.
    async fn history(&self, user_id: Uuid) -> StoreResult<History>;
    async fn history_entry(
        &self,
        user_id: Uuid,
        kind: LogKind,
        id: Uuid,
    ) -> StoreResult<Option<HistoryEntry>>;
    /// Delete every AI log of a user. Appointments and health logs are kept.
    async fn clear_history(&self, user_id: Uuid) -> StoreResult<()>;

    async fn insert_appointment(&self, appointment: AppointmentLog) -> StoreResult<AppointmentLog>;
    /// Appointments dated at or after `now`, soonest first.
    async fn upcoming_appointments(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentLog>>;
    async fn count_upcoming_appointments(&self, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64>;

    /// Replace all health logs of a user with `logs`.
    async fn replace_health_logs(&self, user_id: Uuid, logs: Vec<HealthLog>) -> StoreResult<Vec<HealthLog>>;
    /// Health logs, oldest day first.
    async fn health_logs(&self, user_id: Uuid) -> StoreResult<Vec<HealthLog>>;

    /// Symptom, diet and workout logs created at or after `since`.
    async fn count_recent_logs(&self, user_id: Uuid, since: DateTime<Utc>) -> StoreResult<i64>;
    async fn latest_workout(&self, user_id: Uuid) -> StoreResult<Option<WorkoutLog>>;
}
