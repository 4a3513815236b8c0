/// Common test utilities and fixtures
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use remotejob_core::Notifier;
use remotejob_server::{
    create_router,
    services::{AuthService, WalletEvents},
    state::{AdminCredentials, AppState},
};
use remotejob_storage::Database;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "AdminPassword456!";
pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Records every notification instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> remotejob_core::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub notifier: Arc<RecordingNotifier>,
    pub events: WalletEvents,
    _dir: TempDir,
}

/// Build the full router over a fresh on-disk database
pub async fn create_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Arc::new(Database::connect(url));

    // bcrypt's minimum cost keeps the suite fast
    let auth_service = Arc::new(AuthService::new("test-secret-key".to_string(), 4, 7, 30));
    let admin = AdminCredentials {
        email: ADMIN_EMAIL.to_string(),
        password_hash: auth_service.hash_password(ADMIN_PASSWORD).unwrap(),
    };

    let notifier = Arc::new(RecordingNotifier::default());
    let events = WalletEvents::new(16);

    let app_state = AppState::new(
        Arc::clone(&db),
        Arc::clone(&auth_service),
        notifier.clone(),
        events.clone(),
        Some(admin),
    );

    TestApp {
        router: create_router(app_state),
        db,
        auth_service,
        notifier,
        events,
        _dir: dir,
    }
}

impl TestApp {
    /// Send a request and return the status with the parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Register a worker and return (token, user id)
    pub async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "profileType": "worker",
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": email,
                    "phone": "+44 20 7946 0000",
                    "gender": "female",
                    "country": "UK",
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/auth/login",
                None,
                Some(serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a task as admin and return its id
    pub async fn create_task(&self, admin: &str, title: &str, amount: f64) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/tasks",
                Some(admin),
                Some(serde_json::json!({ "title": title, "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Find the pending submission for a task in the admin review list
    pub async fn pending_submission(&self, admin: &str, task_id: &str) -> String {
        let (status, body) = self
            .send(Method::GET, "/api/admin/task-submissions", Some(admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        body.as_array()
            .unwrap()
            .iter()
            .find(|s| s["taskId"] == task_id)
            .map(|s| s["submissionId"].as_str().unwrap().to_string())
            .expect("no pending submission for task")
    }

    pub async fn balance(&self, token: &str) -> f64 {
        let (status, body) = self.send(Method::GET, "/api/wallet", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        body["balance"].as_f64().unwrap()
    }
}
