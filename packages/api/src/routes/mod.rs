//! HTTP handlers, one module per resource.

pub mod appointments;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod plans;
pub mod users;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::AppState;

async fn index(State(state): State<AppState>) -> String {
    format!("AIMed server is running at port {}", state.settings.server.port)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/users", post(users::register))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/chat", post(chat::chat))
        .route("/api/diet", post(plans::diet))
        .route("/api/workout", post(plans::workout))
        .route("/api/history", get(history::list).delete(history::clear))
        .route("/api/history/{kind}/{id}", get(history::detail))
        .route(
            "/api/appointments",
            get(appointments::upcoming).post(appointments::create),
        )
        .route("/api/health/sync-mock", post(health::sync_mock))
        .route("/api/health/stats", get(health::stats))
        .route("/api/dashboard/stats", get(dashboard::stats))
}
