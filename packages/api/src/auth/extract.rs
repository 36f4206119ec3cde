use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use store::User;

use crate::error::ApiError;
use crate::AppState;

pub const NO_TOKEN: &str = "Not authorized, no token";
pub const TOKEN_FAILED: &str = "Not authorized, token failed";

/// The account behind the request's bearer token.
///
/// Handlers that take an `AuthUser` are protected: a missing header, a bad or expired
/// token, a token for a deleted account, or a failed account lookup all reject
/// with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;

        let Some(user_id) = state.tokens.verify(token) else {
            tracing::warn!("rejected bearer token");
            return Err(ApiError::unauthorized(TOKEN_FAILED));
        };

        match state.store.find_user(user_id).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(ApiError::unauthorized(TOKEN_FAILED)),
            Err(e) => {
                tracing::error!("user lookup for bearer token failed: {}", e);
                Err(ApiError::unauthorized(TOKEN_FAILED))
            }
        }
    }
}
