//! Simulated wearable sync and the per-day activity series.

use axum::{extract::State, Json};
use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use store::HealthLog;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::HealthSyncResponse;
use crate::AppState;

pub const SYNC_DAYS: u64 = 7;

/// One day of plausible activity numbers.
pub fn mock_day<R: Rng>(rng: &mut R, user_id: Uuid, date: NaiveDate) -> HealthLog {
    let steps: i32 = rng.gen_range(3000..=12000);
    let distance = (f64::from(steps) * 0.0008 * 100.0).round() / 100.0;
    let calories = (f64::from(steps) * 0.04).floor() as i32 + rng.gen_range(1200..=1500);
    let heart_rate = rng.gen_range(65..=95);
    let sleep = f64::from(rng.gen_range(50..=90_i32)) / 10.0;

    HealthLog {
        id: Uuid::new_v4(),
        user_id,
        date,
        steps,
        calories,
        distance,
        heart_rate,
        sleep,
    }
}

/// `days` consecutive days ending with `today`, oldest first.
pub fn mock_week<R: Rng>(rng: &mut R, user_id: Uuid, today: NaiveDate, days: u64) -> Vec<HealthLog> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| mock_day(rng, user_id, date))
        .collect()
}

/// `POST /api/health/sync-mock`: replace the user's series with a fresh week.
pub async fn sync_mock(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<HealthSyncResponse>> {
    let logs = {
        let mut rng = rand::thread_rng();
        mock_week(&mut rng, user.id, Utc::now().date_naive(), SYNC_DAYS)
    };

    let data = state
        .store
        .replace_health_logs(user.id, logs)
        .await
        .map_err(|e| ApiError::internal("Server Error", e))?;
    tracing::info!(user_id = %user.id, days = data.len(), "synced mock health data");

    Ok(Json(HealthSyncResponse {
        msg: "Health data synchronized successfully".to_string(),
        data,
    }))
}

/// `GET /api/health/stats`
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<HealthLog>>> {
    Ok(Json(state.store.health_logs(user.id).await?))
}
