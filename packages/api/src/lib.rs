//! # API crate — the AIMed REST surface
//!
//! Builds the axum [`Router`] the `server` binary serves. Handlers reach storage only
//! through [`store::Store`] and the model only through [`agent::Agent`], so the whole
//! surface runs in tests against `MemoryStore` and a scripted model.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Argon2id password hashing, JWT bearer tokens, the [`auth::AuthUser`] extractor |
//! | [`db`] | PostgreSQL pool from settings |
//! | [`error`] | [`ApiError`], rendered as `{"message": ...}` |
//! | [`models`] | Request and response bodies |
//! | [`routes`] | Handlers and the route table |
//! | [`settings`] | Layered configuration |
//!
//! ## Endpoints
//!
//! - **Accounts**: `POST /api/users`, `/api/users/register`, `/api/users/login`
//! - **AI**: `POST /api/chat`, `/api/diet`, `/api/workout`
//! - **History**: `GET|DELETE /api/history`, `GET /api/history/{type}/{id}`
//! - **Tracking**: `GET|POST /api/appointments`, `POST /api/health/sync-mock`,
//!   `GET /api/health/stats`, `GET /api/dashboard/stats`

use std::sync::Arc;

use agent::Agent;
use axum::Router;
use store::Store;

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod settings;

pub use error::{ApiError, ApiResult};
pub use settings::Settings;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub agent: Agent,
    pub tokens: auth::TokenKeys,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, agent: Agent, settings: Settings) -> Self {
        Self {
            store,
            agent,
            tokens: auth::TokenKeys::new(&settings.auth.jwt_secret, settings.auth.token_ttl_days),
            settings: Arc::new(settings),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    routes::router().with_state(state)
}
