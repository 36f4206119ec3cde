use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use store::{AppointmentLog, APPOINTMENT_UPCOMING};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::models::{non_empty, AppointmentRequest};
use crate::AppState;

/// `POST /api/appointments`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<AppointmentRequest>,
) -> ApiResult<(StatusCode, Json<AppointmentLog>)> {
    let (Some(doctor_name), Some(specialty), Some(date)) = (
        non_empty(&body.doctor_name),
        non_empty(&body.specialty),
        non_empty(&body.date),
    ) else {
        return Err(ApiError::bad_request("Please add all fields"));
    };

    let date = DateTime::parse_from_rfc3339(date)
        .map_err(|_| ApiError::bad_request("Invalid appointment date"))?
        .with_timezone(&Utc);

    let appointment = state
        .store
        .insert_appointment(AppointmentLog {
            id: Uuid::new_v4(),
            user_id: user.id,
            doctor_name: doctor_name.to_string(),
            specialty: specialty.to_string(),
            date,
            location: non_empty(&body.location).map(str::to_string),
            status: APPOINTMENT_UPCOMING.to_string(),
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| ApiError::internal("Failed to add appointment", e))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/appointments`: future appointments, soonest first.
pub async fn upcoming(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<AppointmentLog>>> {
    let appointments = state
        .store
        .upcoming_appointments(user.id, Utc::now())
        .await
        .map_err(|e| ApiError::internal("Failed to fetch appointments", e))?;
    Ok(Json(appointments))
}
