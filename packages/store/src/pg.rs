//! # PostgreSQL-backed store
//!
//! [`PgStore`] implements [`Store`] on a shared [`PgPool`]. The schema lives in
//! `packages/store/migrations` and is embedded at compile time; call
//! [`PgStore::migrate`] once at startup.
//!
//! Uniqueness is enforced by the database (`users.email`, `health_logs(user_id, date)`)
//! and unique violations are reported as [`StoreError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;
use crate::repo::{Store, StoreError, StoreResult};

static MIGRATOR: Migrator = sqlx::migrate!();

/// Map a unique-constraint failure to [`StoreError::Duplicate`].
fn unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query_as(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &format!("email {}", user.email)))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_symptom_log(&self, log: SymptomLog) -> StoreResult<SymptomLog> {
        Ok(sqlx::query_as(
            "INSERT INTO symptom_logs (id, user_id, query, ai_response, confidence_score, is_symptom_query, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.query)
        .bind(&log.ai_response)
        .bind(&log.confidence_score)
        .bind(log.is_symptom_query)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_medicine_log(&self, log: MedicineLog) -> StoreResult<MedicineLog> {
        Ok(sqlx::query_as(
            "INSERT INTO medicine_logs (id, user_id, medicine_name, ai_response, prescription_status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.medicine_name)
        .bind(&log.ai_response)
        .bind(&log.prescription_status)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_report_log(&self, log: ReportLog) -> StoreResult<ReportLog> {
        Ok(sqlx::query_as(
            "INSERT INTO report_logs (id, user_id, ocr_text, analysis, created_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.ocr_text)
        .bind(&log.analysis)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_diet_log(&self, log: DietLog) -> StoreResult<DietLog> {
        Ok(sqlx::query_as(
            "INSERT INTO diet_logs (id, user_id, goal, allergies, medical_conditions, ai_plan, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.goal)
        .bind(&log.allergies)
        .bind(&log.medical_conditions)
        .bind(&log.ai_plan)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_workout_log(&self, log: WorkoutLog) -> StoreResult<WorkoutLog> {
        Ok(sqlx::query_as(
            "INSERT INTO workout_logs (id, user_id, age, height, weight, frequency, goal, ai_plan, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(log.age)
        .bind(log.height)
        .bind(log.weight)
        .bind(&log.frequency)
        .bind(&log.goal)
        .bind(&log.ai_plan)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn history(&self, user_id: Uuid) -> StoreResult<History> {
        let (symptoms, medicines, diets, workouts, reports) = tokio::try_join!(
            sqlx::query_as::<_, SymptomLog>("SELECT * FROM symptom_logs WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool),
            sqlx::query_as::<_, MedicineLog>("SELECT * FROM medicine_logs WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool),
            sqlx::query_as::<_, DietLog>("SELECT * FROM diet_logs WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool),
            sqlx::query_as::<_, WorkoutLog>("SELECT * FROM workout_logs WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool),
            sqlx::query_as::<_, ReportLog>("SELECT * FROM report_logs WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool),
        )?;
        Ok(History {
            symptoms,
            medicines,
            diets,
            workouts,
            reports,
        })
    }

    async fn history_entry(
        &self,
        user_id: Uuid,
        kind: LogKind,
        id: Uuid,
    ) -> StoreResult<Option<HistoryEntry>> {
        let pool = &self.pool;
        let entry = match kind {
            LogKind::Symptom => {
                sqlx::query_as::<_, SymptomLog>("SELECT * FROM symptom_logs WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?
                    .map(HistoryEntry::Symptom)
            }
            LogKind::Medicine => {
                sqlx::query_as::<_, MedicineLog>("SELECT * FROM medicine_logs WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?
                    .map(HistoryEntry::Medicine)
            }
            LogKind::Diet => sqlx::query_as::<_, DietLog>("SELECT * FROM diet_logs WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?
                .map(HistoryEntry::Diet),
            LogKind::Workout => {
                sqlx::query_as::<_, WorkoutLog>("SELECT * FROM workout_logs WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?
                    .map(HistoryEntry::Workout)
            }
            LogKind::Report => {
                sqlx::query_as::<_, ReportLog>("SELECT * FROM report_logs WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?
                    .map(HistoryEntry::Report)
            }
        };
        Ok(entry)
    }

    async fn clear_history(&self, user_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for table in ["symptom_logs", "medicine_logs", "diet_logs", "workout_logs", "report_logs"] {
            sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_appointment(&self, appointment: AppointmentLog) -> StoreResult<AppointmentLog> {
        Ok(sqlx::query_as(
            "INSERT INTO appointments (id, user_id, doctor_name, specialty, date, location, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(&appointment.doctor_name)
        .bind(&appointment.specialty)
        .bind(appointment.date)
        .bind(&appointment.location)
        .bind(&appointment.status)
        .bind(appointment.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn upcoming_appointments(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentLog>> {
        Ok(
            sqlx::query_as("SELECT * FROM appointments WHERE user_id = $1 AND date >= $2 ORDER BY date ASC")
                .bind(user_id)
                .bind(now)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn count_upcoming_appointments(&self, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE user_id = $1 AND date >= $2")
                .bind(user_id)
                .bind(now)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn replace_health_logs(&self, user_id: Uuid, logs: Vec<HealthLog>) -> StoreResult<Vec<HealthLog>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM health_logs WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        for log in &logs {
            sqlx::query(
                "INSERT INTO health_logs (id, user_id, date, steps, calories, distance, heart_rate, sleep)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(log.id)
            .bind(user_id)
            .bind(log.date)
            .bind(log.steps)
            .bind(log.calories)
            .bind(log.distance)
            .bind(log.heart_rate)
            .bind(log.sleep)
            .execute(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, &format!("health log for {}", log.date)))?;
        }
        tx.commit().await?;
        Ok(logs)
    }

    async fn health_logs(&self, user_id: Uuid) -> StoreResult<Vec<HealthLog>> {
        Ok(sqlx::query_as("SELECT * FROM health_logs WHERE user_id = $1 ORDER BY date ASC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_recent_logs(&self, user_id: Uuid, since: DateTime<Utc>) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM symptom_logs WHERE user_id = $1 AND created_at >= $2)
              + (SELECT COUNT(*) FROM diet_logs WHERE user_id = $1 AND created_at >= $2)
              + (SELECT COUNT(*) FROM workout_logs WHERE user_id = $1 AND created_at >= $2)",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn latest_workout(&self, user_id: Uuid) -> StoreResult<Option<WorkoutLog>> {
        Ok(sqlx::query_as(
            "SELECT * FROM workout_logs WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
