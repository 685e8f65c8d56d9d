//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use drive_api::AppState;
use drive_api::extractors::{TENANT_ID_HEADER, USER_ID_HEADER};
use drive_core::config::AppConfig;
use drive_database::Stores;

/// Test application context
pub struct TestApp {
    /// The full application, middleware included
    pub router: Router,
}

/// Identity sent in the acting-user headers.
#[derive(Debug, Clone, Copy)]
pub struct TestUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
        }
    }
}

impl TestApp {
    /// Application with default configuration.
    pub fn new() -> Self {
        Self::from_config(test_config())
    }

    /// Application whose new users start with `max_bytes` of quota.
    pub fn with_quota(max_bytes: i64) -> Self {
        let mut config = test_config();
        config.quota.default_max_bytes = max_bytes;
        Self::from_config(config)
    }

    fn from_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Stores::memory());
        Self {
            router: drive_api::build_app(state),
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<&TestUser>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req
                .header(USER_ID_HEADER, user.user_id.to_string())
                .header(TENANT_ID_HEADER, user.tenant_id.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, user: &TestUser, name: &str, parent: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/drive/folders",
                Some(json!({ "name": name, "parentId": parent })),
                Some(user),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Register a file and return the raw response.
    pub async fn register_file(
        &self,
        user: &TestUser,
        name: &str,
        size: i64,
        folder: Option<&str>,
    ) -> TestResponse {
        self.request(
            "POST",
            "/api/drive/files",
            Some(json!({
                "folderId": folder,
                "name": name,
                "storagePath": format!("blobs/{}", Uuid::new_v4()),
                "sizeBytes": size,
            })),
            Some(user),
        )
        .await
    }

    /// Current `usedBytes` for `user`.
    pub async fn used_bytes(&self, user: &TestUser) -> i64 {
        let response = self
            .request("GET", "/api/drive/storage/quota", None, Some(user))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["data"]["usedBytes"]
            .as_i64()
            .expect("usedBytes missing")
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.quota.reconcile_enabled = false;
    config
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `data.id` of a successful response.
    pub fn id(&self) -> String {
        self.body["data"]["id"]
            .as_str()
            .expect("No id in response")
            .to_string()
    }

    /// Error code of a failed response.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
