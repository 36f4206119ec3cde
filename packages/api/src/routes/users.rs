use axum::{extract::State, http::StatusCode, Json};
use store::{normalize_email, StoreError, User};

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::models::{non_empty, AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

pub const MISSING_FIELDS: &str = "Please add all fields";
pub const USER_EXISTS: &str = "User already exists";
pub const INVALID_LOGIN: &str = "Invalid email or password";

fn token_for(state: &AppState, user: &User) -> ApiResult<String> {
    state
        .tokens
        .issue(user.id)
        .map_err(|e| ApiError::internal("Server Error", e))
}

/// `POST /api/users` and `POST /api/users/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let password = body.password.as_deref().filter(|p| !p.is_empty());
    let (Some(name), Some(email), Some(password)) =
        (non_empty(&body.name), non_empty(&body.email), password)
    else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    let email = normalize_email(email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request(USER_EXISTS));
    }

    let password_hash =
        hash_password(password).map_err(|e| ApiError::internal("Server Error", e))?;

    // A concurrent registration can still win the race; the unique index decides.
    let user = match state.store.create_user(User::new(name, &email, password_hash)).await {
        Ok(user) => user,
        Err(StoreError::Duplicate(_)) => return Err(ApiError::bad_request(USER_EXISTS)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "registered user");
    let token = token_for(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, token))))
}

/// `POST /api/users/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (non_empty(&body.email), body.password.as_deref()) else {
        return Err(ApiError::unauthorized(INVALID_LOGIN));
    };

    let Some(user) = state.store.find_user_by_email(&normalize_email(email)).await? else {
        return Err(ApiError::unauthorized(INVALID_LOGIN));
    };

    let valid = verify_password(password, &user.password_hash)
        .map_err(|e| ApiError::internal("Server Error", e))?;
    if !valid {
        return Err(ApiError::unauthorized(INVALID_LOGIN));
    }

    let token = token_for(&state, &user)?;
    Ok(Json(AuthResponse::new(&user, token)))
}
