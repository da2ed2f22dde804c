use safari_connect::{
    api::router::create_router,
    config::Config,
    infra::factory::bootstrap_state,
    state::AppState,
};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use tower::ServiceExt;
use serde_json::Value;

#[allow(dead_code)]
pub struct AuthHeaders {
    pub user_id: String,
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url,
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
        };

        let state = Arc::new(bootstrap_state(&config).await);
        let router = create_router(state.clone());

        Self {
            router,
            db_filename,
            state,
        }
    }

    pub async fn register(&self, name: &str, email: &str, role: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "name": name,
            "email": email,
            "password": "safari-pass-123",
            "role": role
        });

        let (status, body) = self.send("POST", "/api/v1/auth/register", None, Some(payload)).await;
        if status != StatusCode::CREATED {
            panic!("Register failed in test helper: status {} body {}", status, body);
        }

        AuthHeaders {
            user_id: body["user"]["id"].as_str().expect("No user id in body").to_string(),
            access_token: body["access_token"].as_str().expect("No access_token in body").to_string(),
            csrf_token: body["csrf_token"].as_str().expect("No csrf_token in body").to_string(),
        }
    }

    /// Sends a request with the cookie session of `auth`, echoing its CSRF token.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn create_accommodation(&self, host: &AuthHeaders, capacity: i32) -> String {
        let (status, body) = self.send("POST", "/api/v1/accommodations", Some(host), Some(serde_json::json!({
            "title": "Serengeti Tented Camp",
            "description": "Canvas suites on the plains",
            "location": "Serengeti",
            "price_per_night": 150.0,
            "capacity": capacity
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "create accommodation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_transport(&self, driver: &AuthHeaders, total_capacity: i32) -> String {
        let (status, body) = self.send("POST", "/api/v1/transports", Some(driver), Some(serde_json::json!({
            "vehicle_type": "Land Cruiser",
            "price_per_day": 80.0,
            "total_capacity": total_capacity
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "create transport failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
