//! # Domain models for users and their health logs
//!
//! Every record is a flat row owned by a [`User`] through `user_id`. Records are
//! created by a single API call and never updated; AI logs are only removed in bulk
//! when a user clears their history.
//!
//! ## Wire format
//!
//! The JSON shape matches what the browser client already consumes: camelCase field
//! names, the primary key serialised as `_id` and the owner as `user`.
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | An account. The password hash never leaves the server. |
//! | [`SymptomLog`] | A symptom-checker answer with its confidence score. |
//! | [`MedicineLog`] | A medicine fact sheet and whether it needs a prescription. |
//! | [`ReportLog`] | The explanation of a scanned lab report. |
//! | [`DietLog`] | A generated one-day meal plan. |
//! | [`WorkoutLog`] | A generated weekly workout routine with body measurements. |
//! | [`AppointmentLog`] | A doctor appointment. |
//! | [`HealthLog`] | One day of activity metrics. At most one per user per day. |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user record from the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account. The email is normalised so lookups are case-insensitive.
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub query: String,
    pub ai_response: String,
    /// e.g. `"80%"`, or `"N/A"` when the answer carried no score.
    pub confidence_score: Option<String>,
    pub is_symptom_query: bool,
    pub created_at: DateTime<Utc>,
}

impl SymptomLog {
    pub fn new(user_id: Uuid, query: &str, ai_response: &str, confidence_score: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            query: query.to_string(),
            ai_response: ai_response.to_string(),
            confidence_score: Some(confidence_score.to_string()),
            is_symptom_query: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub medicine_name: String,
    pub ai_response: String,
    /// `"Rx"` or `"OTC"`.
    pub prescription_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MedicineLog {
    pub fn new(user_id: Uuid, medicine_name: &str, ai_response: &str, status: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            medicine_name: medicine_name.to_string(),
            ai_response: ai_response.to_string(),
            prescription_status: Some(status.to_string()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    /// Raw text scanned from the report image.
    pub ocr_text: String,
    pub analysis: String,
    pub created_at: DateTime<Utc>,
}

impl ReportLog {
    pub fn new(user_id: Uuid, ocr_text: &str, analysis: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ocr_text: ocr_text.to_string(),
            analysis: analysis.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DietLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub goal: String,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub ai_plan: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub age: i32,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    /// e.g. `"3-4 days/week"`.
    pub frequency: String,
    pub goal: String,
    pub ai_plan: String,
    pub created_at: DateTime<Utc>,
}

impl WorkoutLog {
    /// Body mass index from the recorded height and weight.
    pub fn bmi(&self) -> f64 {
        let height_m = self.height / 100.0;
        self.weight / (height_m * height_m)
    }
}

/// Default status for a freshly booked appointment.
pub const APPOINTMENT_UPCOMING: &str = "Upcoming";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub doctor_name: String,
    /// e.g. `"Cardiologist"`.
    pub specialty: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HealthLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    /// Sent as noon UTC (`2026-03-14T12:00:00Z`) so clients that parse it into
    /// a local date land on the same calendar day.
    #[serde(with = "day_timestamp")]
    pub date: NaiveDate,
    pub steps: i32,
    /// kcal
    pub calories: i32,
    /// km
    pub distance: f64,
    /// Average bpm.
    pub heart_rate: i32,
    /// Hours.
    pub sleep: f64,
}

mod day_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        let ts = date.and_time(noon).and_utc();
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Accepts a full timestamp or a bare `YYYY-MM-DD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc).date_naive());
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(de::Error::custom)
    }
}

/// The AI log kinds that make up a user's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Symptom,
    Medicine,
    Diet,
    Workout,
    Report,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Symptom => "symptom",
            LogKind::Medicine => "medicine",
            LogKind::Diet => "diet",
            LogKind::Workout => "workout",
            LogKind::Report => "report",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symptom" => Ok(LogKind::Symptom),
            "medicine" => Ok(LogKind::Medicine),
            "diet" => Ok(LogKind::Diet),
            "workout" => Ok(LogKind::Workout),
            "report" => Ok(LogKind::Report),
            other => Err(format!("Unknown history type: {}", other)),
        }
    }
}

/// All AI logs of one user, each list newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    pub symptoms: Vec<SymptomLog>,
    pub medicines: Vec<MedicineLog>,
    pub diets: Vec<DietLog>,
    pub workouts: Vec<WorkoutLog>,
    pub reports: Vec<ReportLog>,
}

/// A single history record, serialised as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    Symptom(SymptomLog),
    Medicine(MedicineLog),
    Diet(DietLog),
    Workout(WorkoutLog),
    Report(ReportLog),
}
