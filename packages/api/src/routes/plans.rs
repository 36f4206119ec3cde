//! `POST /api/diet` and `POST /api/workout`: single-shot plan generation.
//!
//! Both run the same agent as chat with a planner system prompt and save the
//! resulting plan before returning it.

use axum::{extract::State, Json};
use agent::prompts::{
    diet_prompt, workout_prompt, DietProfile, WorkoutProfile, DIET_USER_MESSAGE,
    WORKOUT_USER_MESSAGE,
};
use agent::Message;
use chrono::Utc;
use store::{DietLog, WorkoutLog};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::models::{non_empty, DietRequest, PlanResponse, WorkoutRequest};
use crate::AppState;

pub const DIET_FAILED: &str = "Failed to generate diet plan";
pub const WORKOUT_FAILED: &str = "Failed to generate plan";

pub async fn diet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<DietRequest>,
) -> ApiResult<Json<PlanResponse>> {
    let Some(goal) = non_empty(&body.goal) else {
        return Err(ApiError::bad_request("Please add a diet goal"));
    };

    let profile = DietProfile {
        goal,
        allergies: non_empty(&body.allergies),
        conditions: non_empty(&body.conditions),
        age: body.age,
        gender: non_empty(&body.gender),
        weight: body.weight,
    };
    tracing::info!(user_id = %user.id, goal, "generating diet plan");

    let plan = state
        .agent
        .run(vec![
            Message::system(diet_prompt(&profile)),
            Message::user(DIET_USER_MESSAGE),
        ])
        .await
        .map_err(|e| ApiError::internal(DIET_FAILED, e))?;

    state
        .store
        .insert_diet_log(DietLog {
            id: Uuid::new_v4(),
            user_id: user.id,
            goal: goal.to_string(),
            allergies: profile.allergies.map(str::to_string),
            medical_conditions: profile.conditions.map(str::to_string),
            ai_plan: plan.clone(),
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| ApiError::internal(DIET_FAILED, e))?;

    Ok(Json(PlanResponse { plan }))
}

pub async fn workout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<WorkoutRequest>,
) -> ApiResult<Json<PlanResponse>> {
    let (Some(age), Some(height), Some(weight), Some(frequency), Some(goal)) = (
        body.age,
        body.height.filter(|h| *h > 0.0),
        body.weight.filter(|w| *w > 0.0),
        non_empty(&body.frequency),
        non_empty(&body.goal),
    ) else {
        return Err(ApiError::bad_request("Please add all fields"));
    };
    let stored_age =
        i32::try_from(age).map_err(|_| ApiError::bad_request("Please add all fields"))?;

    let profile = WorkoutProfile {
        age,
        height,
        weight,
        gender: non_empty(&body.gender),
        frequency,
        goal,
    };
    tracing::info!(user_id = %user.id, goal, frequency, "generating workout plan");

    let plan = state
        .agent
        .run(vec![
            Message::system(workout_prompt(&profile)),
            Message::user(WORKOUT_USER_MESSAGE),
        ])
        .await
        .map_err(|e| ApiError::internal(WORKOUT_FAILED, e))?;

    state
        .store
        .insert_workout_log(WorkoutLog {
            id: Uuid::new_v4(),
            user_id: user.id,
            age: stored_age,
            height,
            weight,
            frequency: frequency.to_string(),
            goal: goal.to_string(),
            ai_plan: plan.clone(),
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| ApiError::internal(WORKOUT_FAILED, e))?;

    Ok(Json(PlanResponse { plan }))
}
