use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::*;
use crate::repo::{Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    symptoms: Vec<SymptomLog>,
    medicines: Vec<MedicineLog>,
    reports: Vec<ReportLog>,
    diets: Vec<DietLog>,
    workouts: Vec<WorkoutLog>,
    appointments: Vec<AppointmentLog>,
    health: Vec<HealthLog>,
}

/// In-memory Store for testing and database-less local runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rows owned by `user_id`, newest first.
fn owned_newest_first<T: Clone>(
    rows: &[T],
    user_id: Uuid,
    owner: impl Fn(&T) -> Uuid,
    created: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().filter(|r| owner(r) == user_id).cloned().collect();
    out.sort_by_key(|r| std::cmp::Reverse(created(r)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_symptom_log(&self, log: SymptomLog) -> StoreResult<SymptomLog> {
        self.tables.write().await.symptoms.push(log.clone());
        Ok(log)
    }

    async fn insert_medicine_log(&self, log: MedicineLog) -> StoreResult<MedicineLog> {
        self.tables.write().await.medicines.push(log.clone());
        Ok(log)
    }

    async fn insert_report_log(&self, log: ReportLog) -> StoreResult<ReportLog> {
        self.tables.write().await.reports.push(log.clone());
        Ok(log)
    }

    async fn insert_diet_log(&self, log: DietLog) -> StoreResult<DietLog> {
        self.tables.write().await.diets.push(log.clone());
        Ok(log)
    }

    async fn insert_workout_log(&self, log: WorkoutLog) -> StoreResult<WorkoutLog> {
        self.tables.write().await.workouts.push(log.clone());
        Ok(log)
    }

    async fn history(&self, user_id: Uuid) -> StoreResult<History> {
        let t = self.tables.read().await;
        Ok(History {
            symptoms: owned_newest_first(&t.symptoms, user_id, |r| r.user_id, |r| r.created_at),
            medicines: owned_newest_first(&t.medicines, user_id, |r| r.user_id, |r| r.created_at),
            diets: owned_newest_first(&t.diets, user_id, |r| r.user_id, |r| r.created_at),
            workouts: owned_newest_first(&t.workouts, user_id, |r| r.user_id, |r| r.created_at),
            reports: owned_newest_first(&t.reports, user_id, |r| r.user_id, |r| r.created_at),
        })
    }

    async fn history_entry(
        &self,
        user_id: Uuid,
        kind: LogKind,
        id: Uuid,
    ) -> StoreResult<Option<HistoryEntry>> {
        let t = self.tables.read().await;
        let entry = match kind {
            LogKind::Symptom => t
                .symptoms
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned()
                .map(HistoryEntry::Symptom),
            LogKind::Medicine => t
                .medicines
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned()
                .map(HistoryEntry::Medicine),
            LogKind::Diet => t
                .diets
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned()
                .map(HistoryEntry::Diet),
            LogKind::Workout => t
                .workouts
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned()
                .map(HistoryEntry::Workout),
            LogKind::Report => t
                .reports
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned()
                .map(HistoryEntry::Report),
        };
        Ok(entry)
    }

    async fn clear_history(&self, user_id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.symptoms.retain(|r| r.user_id != user_id);
        t.medicines.retain(|r| r.user_id != user_id);
        t.diets.retain(|r| r.user_id != user_id);
        t.workouts.retain(|r| r.user_id != user_id);
        t.reports.retain(|r| r.user_id != user_id);
        Ok(())
    }

    async fn insert_appointment(&self, appointment: AppointmentLog) -> StoreResult<AppointmentLog> {
        self.tables.write().await.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn upcoming_appointments(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentLog>> {
        let t = self.tables.read().await;
        let mut out: Vec<AppointmentLog> = t
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id && a.date >= now)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.date);
        Ok(out)
    }

    async fn count_upcoming_appointments(&self, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id && a.date >= now)
            .count() as i64)
    }

    async fn replace_health_logs(&self, user_id: Uuid, logs: Vec<HealthLog>) -> StoreResult<Vec<HealthLog>> {
        let mut days = HashSet::new();
        for log in &logs {
            if !days.insert(log.date) {
                return Err(StoreError::Duplicate(format!("health log for {}", log.date)));
            }
        }
        let mut t = self.tables.write().await;
        t.health.retain(|h| h.user_id != user_id);
        t.health.extend(logs.iter().cloned());
        Ok(logs)
    }

    async fn health_logs(&self, user_id: Uuid) -> StoreResult<Vec<HealthLog>> {
        let t = self.tables.read().await;
        let mut out: Vec<HealthLog> = t.health.iter().filter(|h| h.user_id == user_id).cloned().collect();
        out.sort_by_key(|h| h.date);
        Ok(out)
    }

    async fn count_recent_logs(&self, user_id: Uuid, since: DateTime<Utc>) -> StoreResult<i64> {
        let t = self.tables.read().await;
        let symptoms = t.symptoms.iter().filter(|r| r.user_id == user_id && r.created_at >= since).count();
        let diets = t.diets.iter().filter(|r| r.user_id == user_id && r.created_at >= since).count();
        let workouts = t.workouts.iter().filter(|r| r.user_id == user_id && r.created_at >= since).count();
        Ok((symptoms + diets + workouts) as i64)
    }

    async fn latest_workout(&self, user_id: Uuid) -> StoreResult<Option<WorkoutLog>> {
        let t = self.tables.read().await;
        Ok(t
            .workouts
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}
