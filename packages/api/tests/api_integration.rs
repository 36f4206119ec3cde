use std::sync::Arc;

use agent::{Agent, AgentError, AgentResult, ChatModel, Message, Role, ToolSpec};
use api::{create_router, AppState, Settings};
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use store::models::*;
use store::{MemoryStore, Store, StoreError, StoreResult};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Answers every request with the same text and records what it was sent.
struct CannedModel {
    reply: String,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl CannedModel {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> AgentResult<Message> {
        self.seen.lock().await.push(messages.to_vec());
        Ok(Message::assistant(self.reply.clone()))
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

struct DownModel;

#[async_trait]
impl ChatModel for DownModel {
    async fn complete(&self, _messages: &[Message], _tools: &[ToolSpec]) -> AgentResult<Message> {
        Err(AgentError::Api {
            status: 503,
            body: "upstream unavailable".into(),
        })
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

const SYMPTOM_REPLY: &str =
    "🎯 **Confidence: 85%** (Based on 3 medical sources)\n\n**Causes:**\n- Dehydration";

struct TestApp {
    server: TestServer,
    store: Arc<MemoryStore>,
}

fn test_app(model: Arc<dyn ChatModel>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Agent::new(model), Settings::default());
    let server = TestServer::new(create_router(state)).unwrap();
    TestApp { server, store }
}

/// A [`MemoryStore`] whose user lookup by id fails once `down` is set.
struct FlakyStore {
    inner: MemoryStore,
    down: std::sync::atomic::AtomicBool,
}

impl FlakyStore {
    fn lookup_fails(&self) -> bool {
        self.down.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.inner.create_user(user).await
    }
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        if self.lookup_fails() {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.find_user(id).await
    }
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }
    async fn insert_symptom_log(&self, log: SymptomLog) -> StoreResult<SymptomLog> {
        self.inner.insert_symptom_log(log).await
    }
    async fn insert_medicine_log(&self, log: MedicineLog) -> StoreResult<MedicineLog> {
        self.inner.insert_medicine_log(log).await
    }
    async fn insert_report_log(&self, log: ReportLog) -> StoreResult<ReportLog> {
        self.inner.insert_report_log(log).await
    }
    async fn insert_diet_log(&self, log: DietLog) -> StoreResult<DietLog> {
        self.inner.insert_diet_log(log).await
    }
    async fn insert_workout_log(&self, log: WorkoutLog) -> StoreResult<WorkoutLog> {
        self.inner.insert_workout_log(log).await
    }
    async fn history(&self, user_id: Uuid) -> StoreResult<History> {
        self.inner.history(user_id).await
    }
    async fn history_entry(
        &self,
        user_id: Uuid,
        kind: LogKind,
        id: Uuid,
    ) -> StoreResult<Option<HistoryEntry>> {
        self.inner.history_entry(user_id, kind, id).await
    }
    async fn clear_history(&self, user_id: Uuid) -> StoreResult<()> {
        self.inner.clear_history(user_id).await
    }
    async fn insert_appointment(&self, appointment: AppointmentLog) -> StoreResult<AppointmentLog> {
        self.inner.insert_appointment(appointment).await
    }
    async fn upcoming_appointments(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentLog>> {
        self.inner.upcoming_appointments(user_id, now).await
    }
    async fn count_upcoming_appointments(&self, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64> {
        self.inner.count_upcoming_appointments(user_id, now).await
    }
    async fn replace_health_logs(&self, user_id: Uuid, logs: Vec<HealthLog>) -> StoreResult<Vec<HealthLog>> {
        self.inner.replace_health_logs(user_id, logs).await
    }
    async fn health_logs(&self, user_id: Uuid) -> StoreResult<Vec<HealthLog>> {
        self.inner.health_logs(user_id).await
    }
    async fn count_recent_logs(&self, user_id: Uuid, since: DateTime<Utc>) -> StoreResult<i64> {
        self.inner.count_recent_logs(user_id, since).await
    }
    async fn latest_workout(&self, user_id: Uuid) -> StoreResult<Option<WorkoutLog>> {
        self.inner.latest_workout(user_id).await
    }
}

async fn register(server: &TestServer, name: &str, email: &str) -> (String, String) {
    let resp = server
        .post("/api/users/register")
        .json(&json!({"name": name, "email": email, "password": "s3cret-pass"}))
        .await;
    assert_eq!(resp.status_code(), 201);
    let body: Value = resp.json();
    (
        body["_id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn index_reports_port() {
    let app = test_app(CannedModel::new(""));
    let resp = app.server.get("/").await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.text(), "AIMed server is running at port 5000");
}

#[tokio::test]
async fn register_and_login() {
    let app = test_app(CannedModel::new(""));

    let resp = app
        .server
        .post("/api/users")
        .json(&json!({"name": "Asha", "email": " Asha@Example.com", "password": "s3cret-pass"}))
        .await;
    assert_eq!(resp.status_code(), 201);
    let body: Value = resp.json();
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["email"], "asha@example.com");
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert!(body.get("password").is_none());

    let dup = app
        .server
        .post("/api/users/register")
        .json(&json!({"name": "Other", "email": "ASHA@example.com", "password": "x"}))
        .await;
    assert_eq!(dup.status_code(), 400);
    assert_eq!(dup.json::<Value>()["message"], "User already exists");

    let login = app
        .server
        .post("/api/users/login")
        .json(&json!({"email": "asha@example.com", "password": "s3cret-pass"}))
        .await;
    assert_eq!(login.status_code(), 200);
    assert_eq!(login.json::<Value>()["_id"], body["_id"]);

    let wrong = app
        .server
        .post("/api/users/login")
        .json(&json!({"email": "asha@example.com", "password": "nope"}))
        .await;
    assert_eq!(wrong.status_code(), 401);
    assert_eq!(wrong.json::<Value>()["message"], "Invalid email or password");

    let unknown = app
        .server
        .post("/api/users/login")
        .json(&json!({"email": "ghost@example.com", "password": "s3cret-pass"}))
        .await;
    assert_eq!(unknown.status_code(), 401);
}

#[tokio::test]
async fn register_requires_all_fields() {
    let app = test_app(CannedModel::new(""));
    let resp = app
        .server
        .post("/api/users")
        .json(&json!({"name": "Asha", "email": "asha@example.com"}))
        .await;
    assert_eq!(resp.status_code(), 400);
    assert_eq!(resp.json::<Value>()["message"], "Please add all fields");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app(CannedModel::new(""));

    let resp = app.server.get("/api/history").await;
    assert_eq!(resp.status_code(), 401);
    assert_eq!(resp.json::<Value>()["message"], "Not authorized, no token");

    let resp = app
        .server
        .get("/api/dashboard/stats")
        .authorization_bearer("garbage")
        .await;
    assert_eq!(resp.status_code(), 401);
    assert_eq!(resp.json::<Value>()["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn failed_user_lookup_is_a_401() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        down: std::sync::atomic::AtomicBool::new(false),
    });
    let state = AppState::new(
        store.clone(),
        Agent::new(CannedModel::new("")),
        Settings::default(),
    );
    let server = TestServer::new(create_router(state)).unwrap();
    let (_, token) = register(&server, "Asha", "asha@example.com").await;

    server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    store.down.store(true, std::sync::atomic::Ordering::SeqCst);
    let resp = server.get("/api/history").authorization_bearer(&token).await;
    assert_eq!(resp.status_code(), 401);
    assert_eq!(
        resp.json::<Value>(),
        json!({"message": "Not authorized, token failed"})
    );
}

#[tokio::test]
async fn malformed_bodies_render_a_message() {
    let app = test_app(CannedModel::new(""));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let resp = app
        .server
        .post("/api/workout")
        .authorization_bearer(&token)
        .json(&json!({"age": -3, "height": "180", "weight": "70", "frequency": "3 days", "goal": "Fitness"}))
        .await;
    assert_eq!(resp.status_code(), 400);
    assert!(resp.json::<Value>()["message"].is_string());

    let resp = app
        .server
        .post("/api/users")
        .json(&json!({"name": 5, "email": "a@b.c", "password": "x"}))
        .await;
    assert_eq!(resp.status_code(), 400);
    assert!(resp.json::<Value>()["message"].is_string());

    let resp = app
        .server
        .post("/api/chat")
        .authorization_bearer(&token)
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn symptom_chat_is_saved_with_confidence() {
    let model = CannedModel::new(SYMPTOM_REPLY);
    let app = test_app(model.clone());
    let (user_id, token) = register(&app.server, "Asha", "asha@example.com").await;

    let resp = app
        .server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "I have a headache"}))
        .await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.json::<Value>()["reply"], SYMPTOM_REPLY);

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .json();
    let symptoms = history["symptoms"].as_array().unwrap();
    assert_eq!(symptoms.len(), 1);
    assert_eq!(symptoms[0]["query"], "I have a headache");
    assert_eq!(symptoms[0]["confidenceScore"], "85%");
    assert_eq!(symptoms[0]["user"], user_id);

    let seen = model.seen.lock().await;
    assert_eq!(seen[0][0].role, Role::System);
    assert_eq!(seen[0][1].content, "I have a headache");
}

#[tokio::test]
async fn small_talk_is_not_saved() {
    let app = test_app(CannedModel::new("Hello! How are you feeling today?"));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let resp = app
        .server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "Hi"}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(history["symptoms"], json!([]));
}

#[tokio::test]
async fn medicine_and_report_modes() {
    let model = CannedModel::new("🎯 **Confidence: 90%**\n⚠️ **PRESCRIPTION REQUIRED**");
    let app = test_app(model.clone());
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    app.server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "MEDICINE_QUERY: Azithromycin"}))
        .await
        .assert_status_ok();
    app.server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "REPORT_ANALYSIS: Hemoglobin 10.2 g/dL"}))
        .await
        .assert_status_ok();

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(history["medicines"][0]["medicineName"], "Azithromycin");
    assert_eq!(history["medicines"][0]["prescriptionStatus"], "Rx");
    assert_eq!(history["reports"][0]["ocrText"], "Hemoglobin 10.2 g/dL");
    assert_eq!(history["symptoms"], json!([]));

    let seen = model.seen.lock().await;
    assert_eq!(
        seen[0][1].content,
        "Research this medicine and provide a structured report: Azithromycin"
    );
}

#[tokio::test]
async fn agent_failure_is_a_500() {
    let app = test_app(Arc::new(DownModel));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let resp = app
        .server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "fever"}))
        .await;
    assert_eq!(resp.status_code(), 500);
    assert_eq!(resp.json::<Value>(), json!({"message": "Agent Service Error"}));

    let resp = app
        .server
        .post("/api/diet")
        .authorization_bearer(&token)
        .json(&json!({"goal": "Weight Loss"}))
        .await;
    assert_eq!(resp.status_code(), 500);
    assert_eq!(resp.json::<Value>()["message"], "Failed to generate diet plan");

    let resp = app
        .server
        .post("/api/workout")
        .authorization_bearer(&token)
        .json(&json!({"age": 30, "height": 175, "weight": 70, "frequency": "3 days", "goal": "Strength"}))
        .await;
    assert_eq!(resp.status_code(), 500);
    assert_eq!(resp.json::<Value>()["message"], "Failed to generate plan");
}

#[tokio::test]
async fn history_is_scoped_to_its_owner() {
    let app = test_app(CannedModel::new(SYMPTOM_REPLY));
    let (_, alice) = register(&app.server, "Alice", "alice@example.com").await;
    let (_, bob) = register(&app.server, "Bob", "bob@example.com").await;

    app.server
        .post("/api/chat")
        .authorization_bearer(&alice)
        .json(&json!({"message": "sore throat"}))
        .await
        .assert_status_ok();

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&alice)
        .await
        .json();
    let id = history["symptoms"][0]["_id"].as_str().unwrap().to_string();

    let own = app
        .server
        .get(&format!("/api/history/symptom/{}", id))
        .authorization_bearer(&alice)
        .await;
    assert_eq!(own.status_code(), 200);
    assert_eq!(own.json::<Value>()["query"], "sore throat");

    let foreign = app
        .server
        .get(&format!("/api/history/symptom/{}", id))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(foreign.status_code(), 404);
    assert_eq!(foreign.json::<Value>()["message"], "Record not found");

    let bob_history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&bob)
        .await
        .json();
    assert_eq!(bob_history["symptoms"], json!([]));

    for path in [
        format!("/api/history/medicine/{}", id),
        format!("/api/history/appointment/{}", id),
        "/api/history/symptom/not-a-uuid".to_string(),
    ] {
        let resp = app.server.get(&path).authorization_bearer(&alice).await;
        assert_eq!(resp.status_code(), 404, "{}", path);
    }
}

#[tokio::test]
async fn clear_history_keeps_tracking_data() {
    let app = test_app(CannedModel::new(SYMPTOM_REPLY));
    let (user_id, token) = register(&app.server, "Asha", "asha@example.com").await;

    app.server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({"message": "cough"}))
        .await
        .assert_status_ok();
    app.server
        .post("/api/diet")
        .authorization_bearer(&token)
        .json(&json!({"goal": "Weight Loss"}))
        .await
        .assert_status_ok();
    app.server
        .post("/api/health/sync-mock")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let resp = app.server.delete("/api/history").authorization_bearer(&token).await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.json::<Value>(), json!({"message": "History Cleared"}));

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .json();
    for key in ["symptoms", "medicines", "diets", "workouts", "reports"] {
        assert_eq!(history[key], json!([]), "{}", key);
    }

    let user_id = user_id.parse().unwrap();
    assert_eq!(app.store.health_logs(user_id).await.unwrap().len(), 7);
}

#[tokio::test]
async fn diet_plan() {
    let model = CannedModel::new("## 🥗 Personalized Nutrition Plan");
    let app = test_app(model.clone());
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let missing = app
        .server
        .post("/api/diet")
        .authorization_bearer(&token)
        .json(&json!({"allergies": "peanuts"}))
        .await;
    assert_eq!(missing.status_code(), 400);

    let resp = app
        .server
        .post("/api/diet")
        .authorization_bearer(&token)
        .json(&json!({
            "goal": "Weight Loss",
            "age": "",
            "gender": "Male",
            "weight": "82",
            "allergies": "peanuts",
            "conditions": ""
        }))
        .await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.json::<Value>()["plan"], "## 🥗 Personalized Nutrition Plan");

    let seen = model.seen.lock().await;
    let system = &seen[0][0].content;
    assert!(system.contains("- Allergies: peanuts"));
    assert!(system.contains("- Medical Conditions: None"));
    assert!(system.contains("not specified years old, Male, 82 kg"));
    assert_eq!(seen[0][1].content, "Create my diet plan.");

    let history: Value = app
        .server
        .get("/api/history")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(history["diets"][0]["goal"], "Weight Loss");
    assert_eq!(history["diets"][0]["allergies"], "peanuts");
    assert_eq!(history["diets"][0]["medicalConditions"], Value::Null);
}

#[tokio::test]
async fn workout_plan_feeds_dashboard() {
    let app = test_app(CannedModel::new("## 🏋️ Personalized Workout Plan"));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let empty: Value = app
        .server
        .get("/api/dashboard/stats")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(
        empty,
        json!({"appointments": 0, "pendingReports": 0, "healthScore": "--"})
    );

    let missing = app
        .server
        .post("/api/workout")
        .authorization_bearer(&token)
        .json(&json!({"age": "", "height": "180", "weight": "71", "frequency": "3 days", "goal": "Fitness"}))
        .await;
    assert_eq!(missing.status_code(), 400);

    let resp = app
        .server
        .post("/api/workout")
        .authorization_bearer(&token)
        .json(&json!({
            "age": "29",
            "height": "180",
            "weight": "71.28",
            "gender": "Male",
            "frequency": "Regular (2-4 days/week)",
            "goal": "Weight Loss"
        }))
        .await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.json::<Value>()["plan"], "## 🏋️ Personalized Workout Plan");

    let stats: Value = app
        .server
        .get("/api/dashboard/stats")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(stats["healthScore"], 100);
    assert_eq!(stats["pendingReports"], 1);
}

#[tokio::test]
async fn appointments_list_only_upcoming() {
    let app = test_app(CannedModel::new(""));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    let now = Utc::now();
    for (doctor, offset) in [("Dr. Later", 10), ("Dr. Past", -2), ("Dr. Soon", 3)] {
        let resp = app
            .server
            .post("/api/appointments")
            .authorization_bearer(&token)
            .json(&json!({
                "doctorName": doctor,
                "specialty": "Cardiologist",
                "date": (now + Duration::days(offset)).to_rfc3339(),
                "location": "Apollo Hospital"
            }))
            .await;
        assert_eq!(resp.status_code(), 201);
        assert_eq!(resp.json::<Value>()["status"], "Upcoming");
    }

    let list: Value = app
        .server
        .get("/api/appointments")
        .authorization_bearer(&token)
        .await
        .json();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["doctorName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dr. Soon", "Dr. Later"]);

    let stats: Value = app
        .server
        .get("/api/dashboard/stats")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(stats["appointments"], 2);

    let bad = app
        .server
        .post("/api/appointments")
        .authorization_bearer(&token)
        .json(&json!({"doctorName": "Dr. X", "specialty": "ENT", "date": "tomorrow"}))
        .await;
    assert_eq!(bad.status_code(), 400);
}

#[tokio::test]
async fn health_sync_replaces_the_week() {
    let app = test_app(CannedModel::new(""));
    let (_, token) = register(&app.server, "Asha", "asha@example.com").await;

    for _ in 0..2 {
        let resp = app
            .server
            .post("/api/health/sync-mock")
            .authorization_bearer(&token)
            .await;
        assert_eq!(resp.status_code(), 200);
        let body: Value = resp.json();
        assert_eq!(body["msg"], "Health data synchronized successfully");
        assert_eq!(body["data"].as_array().unwrap().len(), 7);
    }

    let stats: Value = app
        .server
        .get("/api/health/stats")
        .authorization_bearer(&token)
        .await
        .json();
    let days = stats.as_array().unwrap();
    assert_eq!(days.len(), 7);

    let dates: Vec<&str> = days.iter().map(|d| d["date"].as_str().unwrap()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(
        *dates.last().unwrap(),
        format!("{}T12:00:00Z", Utc::now().date_naive())
    );

    for day in days {
        let steps = day["steps"].as_i64().unwrap();
        assert!((3000..=12000).contains(&steps));
        assert!(day["heartRate"].is_i64());
    }
}
