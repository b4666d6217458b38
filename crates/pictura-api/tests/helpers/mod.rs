//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p pictura-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use pictura_api::setup::{routes, services};
use pictura_api::state::AppState;
use pictura_core::{Config, ConverterConfig, DeliveryMode};
use std::sync::Arc;
use tempfile::TempDir;

/// Upload limits used by every test app
pub const TEST_MAX_FILES: usize = 3;
pub const TEST_MAX_FILE_SIZE: usize = 1024 * 1024;

/// Test application: server plus the scratch directory backing its storage.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn create_test_config(temp_dir: &TempDir, delivery_mode: DeliveryMode) -> Config {
    let mut inner = ConverterConfig::default();
    inner.base.environment = "test".to_string();
    inner.max_files = TEST_MAX_FILES;
    inner.max_file_size_bytes = TEST_MAX_FILE_SIZE;
    // Fastest libwebp method keeps the large lossless case quick
    inner.webp_effort = 1;
    inner.max_concurrent_conversions = 4;
    inner.delivery_mode = delivery_mode;
    inner.storage_root = temp_dir.path().to_path_buf();
    inner.cleanup_enabled = false;
    Config(Box::new(inner))
}

/// Serve an already assembled state, for tests that swap pipeline parts.
pub async fn serve_state(config: &Config, state: Arc<AppState>, temp_dir: TempDir) -> TestApp {
    let app = routes::setup_routes(config, state.clone())
        .await
        .expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Test app whose config is adjusted by `customize` before services start.
pub async fn setup_test_app_with(
    delivery_mode: DeliveryMode,
    customize: impl FnOnce(&mut ConverterConfig),
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = create_test_config(&temp_dir, delivery_mode);
    customize(&mut config.0);

    let state = services::initialize_services(&config)
        .await
        .expect("Failed to initialize services");
    serve_state(&config, state, temp_dir).await
}

pub async fn setup_test_app_with_mode(delivery_mode: DeliveryMode) -> TestApp {
    setup_test_app_with(delivery_mode, |_| {}).await
}

/// Disk delivery mode with isolated storage.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_mode(DeliveryMode::Disk).await
}

pub fn file_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string())
}

/// Convert `files` (name, bytes, mime) and return the parsed JSON body.
pub async fn convert(
    client: &TestServer,
    files: Vec<(&str, Vec<u8>, &str)>,
    quality: Option<&str>,
) -> serde_json::Value {
    let mut form = MultipartForm::new();
    if let Some(quality) = quality {
        form = form.add_text("quality", quality.to_string());
    }
    for (name, data, mime) in files {
        form = form.add_part("images", file_part(data, name, mime));
    }

    let response = client.post("/api/convert").multipart(form).await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    response.json()
}
