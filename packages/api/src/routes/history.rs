use axum::{
    extract::{Path, State},
    Json,
};
use store::{History, HistoryEntry, LogKind};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::MessageResponse;
use crate::AppState;

pub const NOT_FOUND: &str = "Record not found";

/// `GET /api/history`
pub async fn list(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<History>> {
    Ok(Json(state.store.history(user.id).await?))
}

/// `GET /api/history/{type}/{id}`. An unknown type, a malformed id and another
/// user's record are all indistinguishable from a missing one.
pub async fn detail(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<HistoryEntry>> {
    let (Ok(kind), Ok(id)) = (kind.parse::<LogKind>(), Uuid::parse_str(&id)) else {
        return Err(ApiError::not_found(NOT_FOUND));
    };

    state
        .store
        .history_entry(user.id, kind, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// `DELETE /api/history`
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    state
        .store
        .clear_history(user.id)
        .await
        .map_err(|e| ApiError::internal("Error clearing history", e))?;
    tracing::info!(user_id = %user.id, "cleared history");

    Ok(Json(MessageResponse {
        message: "History Cleared".to_string(),
    }))
}
