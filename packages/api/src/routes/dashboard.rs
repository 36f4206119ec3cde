use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use store::WorkoutLog;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::models::{DashboardStats, HealthScore};
use crate::AppState;

/// Score from the most recent workout plan's BMI: a base of 50, a band bonus, and 10
/// for having a plan at all.
pub fn health_score(latest_workout: Option<&WorkoutLog>) -> HealthScore {
    let Some(workout) = latest_workout else {
        return HealthScore::UNKNOWN;
    };

    let bmi = workout.bmi();
    let band = if (18.5..=24.9).contains(&bmi) {
        40
    } else if (25.0..=29.9).contains(&bmi) {
        20
    } else {
        10
    };
    HealthScore::Score(50 + band + 10)
}

/// `GET /api/dashboard/stats`
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DashboardStats>> {
    let now = Utc::now();
    let (pending_reports, latest_workout, appointments) = tokio::try_join!(
        state.store.count_recent_logs(user.id, now - Duration::hours(24)),
        state.store.latest_workout(user.id),
        state.store.count_upcoming_appointments(user.id, now),
    )?;

    Ok(Json(DashboardStats {
        appointments,
        pending_reports,
        health_score: health_score(latest_workout.as_ref()),
    }))
}
