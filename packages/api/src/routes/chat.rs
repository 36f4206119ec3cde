//! `POST /api/chat`: one agent run per message.
//!
//! The message prefix picks the mode (see [`ChatMode::detect`]). After the run the
//! answer is kept when it is worth keeping:
//!
//! | Mode | Saved as | When |
//! |------|----------|------|
//! | Medicine | `MedicineLog` with Rx/OTC status | always |
//! | Report | `ReportLog` with the scanned text | always |
//! | Symptom | `SymptomLog` with the confidence score | only for real symptom answers, not small talk |

use axum::{extract::State, Json};
use agent::inspect::{confidence_score, is_symptom_check, prescription_status};
use agent::prompts::{chat_transcript, ChatMode};
use store::{MedicineLog, ReportLog, SymptomLog, User};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::models::{ChatRequest, ChatResponse};
use crate::AppState;

pub const AGENT_ERROR: &str = "Agent Service Error";

pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let message = body.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    let (mode, subject) = ChatMode::detect(&message);
    tracing::info!(user_id = %user.id, mode = mode.as_str(), "chat request");

    let reply = state
        .agent
        .run(chat_transcript(mode, subject))
        .await
        .map_err(|e| ApiError::internal(AGENT_ERROR, e))?;

    save_reply(&state, &user, mode, subject, &message, &reply)
        .await
        .map_err(|e| ApiError::internal(AGENT_ERROR, e))?;

    Ok(Json(ChatResponse { reply }))
}

async fn save_reply(
    state: &AppState,
    user: &User,
    mode: ChatMode,
    subject: &str,
    message: &str,
    reply: &str,
) -> store::StoreResult<()> {
    match mode {
        ChatMode::Medicine => {
            let status = prescription_status(reply);
            state
                .store
                .insert_medicine_log(MedicineLog::new(user.id, subject, reply, status))
                .await?;
            tracing::info!(user_id = %user.id, status, "saved medicine log");
        }
        ChatMode::Report => {
            state
                .store
                .insert_report_log(ReportLog::new(user.id, subject, reply))
                .await?;
            tracing::info!(user_id = %user.id, "saved report log");
        }
        ChatMode::Symptom if is_symptom_check(reply) => {
            let score = confidence_score(reply);
            state
                .store
                .insert_symptom_log(SymptomLog::new(user.id, message, reply, &score))
                .await?;
            tracing::info!(user_id = %user.id, score = %score, "saved symptom log");
        }
        ChatMode::Symptom => {
            tracing::debug!(user_id = %user.id, "small talk, not saved");
        }
    }
    Ok(())
}
