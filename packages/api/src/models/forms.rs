//! Bodies for the chat, planner, appointment, health and dashboard endpoints.
//!
//! Browser forms post numeric inputs as strings (`"age": ""`, `"weight": "72.5"`), so
//! numeric fields go through [`lenient_number`]: a JSON number or a numeric string is
//! accepted, and an empty or unparsable string reads as absent.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use store::HealthLog;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

pub fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    Ok(match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Trimmed, non-empty text or `None`.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DietRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<u32>,
    /// Centimetres.
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// Kilograms.
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    /// RFC 3339 timestamp, as produced by `Date.prototype.toJSON`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSyncResponse {
    pub msg: String,
    pub data: Vec<HealthLog>,
}

/// A score out of 100, or `"--"` before the first workout plan.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HealthScore {
    Score(u32),
    Unknown(&'static str),
}

impl HealthScore {
    pub const UNKNOWN: HealthScore = HealthScore::Unknown("--");
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub appointments: i64,
    pub pending_reports: i64,
    pub health_score: HealthScore,
}
