//! Test helpers for HTTP API tests.
//!
//! Builds an axum-test `TestServer` over an in-memory database and a
//! temporary storage directory.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use fileshare::config::Config;
use fileshare::file::FileStorage;
use fileshare::web::handlers::AppState;
use fileshare::web::middleware::RateLimitState;
use fileshare::web::router::create_router;
use fileshare::Database;

/// Public base URL used by test servers.
pub const BASE_URL: &str = "http://files.test";

/// A running test server with direct access to its database and storage.
pub struct TestContext {
    pub server: TestServer,
    pub db: Database,
    pub storage: FileStorage,
    _temp_dir: TempDir,
}

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.public_base_url = BASE_URL.to_string();
    config.server.rate_limit_per_minute = 10_000;
    config.files.allowed_extensions = vec!["*".to_string()];
    config
}

/// Create a test server with the default test configuration.
pub async fn create_test_server() -> TestContext {
    create_test_server_with(create_test_config()).await
}

/// Create a test server with a custom configuration.
pub async fn create_test_server_with(config: Config) -> TestContext {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::new(temp_dir.path()).expect("Failed to create storage");
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(db.clone(), storage.clone(), &config));
    let rate_limit = Arc::new(RateLimitState::new(config.server.rate_limit_per_minute));
    let router = create_router(app_state, &config.server.cors_origins, rate_limit);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        db,
        storage,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with a single file part.
pub fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}

/// Upload a file and return the response `data` object.
pub async fn upload(server: &TestServer, form: MultipartForm) -> Value {
    let response = server.post("/upload").multipart(form).await;
    assert_eq!(
        response.status_code(),
        201,
        "upload failed: {}",
        response.text()
    );
    response.json::<Value>()["data"].clone()
}

/// Link id from an upload response.
pub fn link_id(data: &Value) -> String {
    data["link_id"].as_str().unwrap().to_string()
}

/// Stored name from an upload response.
pub fn stored_name(data: &Value) -> String {
    data["file"]["stored_name"].as_str().unwrap().to_string()
}

/// File id from an upload response.
pub fn file_id(data: &Value) -> String {
    data["file"]["id"].as_str().unwrap().to_string()
}

/// Error reason from a denial body.
pub fn error_reason(body: &Value) -> &str {
    body["error"]["reason"].as_str().unwrap_or("")
}
