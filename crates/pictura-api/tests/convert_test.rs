//! Conversion endpoint integration tests.
//!
//! Run with: `cargo test -p pictura-api --test convert_test`

mod helpers;

use async_trait::async_trait;
use axum_test::multipart::MultipartForm;
use bytes::Bytes;
use helpers::fixtures::{create_test_jpeg, create_test_png};
use helpers::{
    convert, create_test_config, file_part, serve_state, setup_test_app, setup_test_app_with,
    setup_test_app_with_mode, TEST_MAX_FILE_SIZE,
};
use pictura_api::state::AppState;
use pictura_core::DeliveryMode;
use pictura_services::{
    ArtifactSink, BatchCoordinator, ConversionWorker, DiskSink, SinkError, StorageArea,
    UploadValidator, WebpCodec,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Disk sink that stalls before storing anything.
struct StallingSink {
    inner: DiskSink,
    delay: Duration,
}

#[async_trait]
impl ArtifactSink for StallingSink {
    async fn deliver(&self, name: &str, data: Bytes) -> Result<String, SinkError> {
        tokio::time::sleep(self.delay).await;
        self.inner.deliver(name, data).await
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Disk
    }
}

#[tokio::test]
async fn test_partial_failure_is_reported_per_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let body = convert(
        client,
        vec![
            ("one.jpg", create_test_jpeg(32, 32), "image/jpeg"),
            ("empty.jpg", Vec::new(), "image/jpeg"),
            ("two.jpg", create_test_jpeg(48, 16), "image/jpeg"),
        ],
        Some("85"),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["successful"], 2);
    assert_eq!(body["stats"]["failed"], 1);
    assert!(body["stats"]["processingTimeMs"].is_u64());

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["file"], "empty.jpg");
    assert_eq!(errors[0]["reason"], "decode_error");

    let files = body["files"].as_array().unwrap();
    assert_eq!(files[0]["originalName"], "one.jpg");
    assert_eq!(files[1]["originalName"], "two.jpg");
    assert_eq!(files[1]["width"], 48);
    assert_eq!(files[1]["height"], 16);
    for file in files {
        assert_eq!(file["format"], "webp");
        assert_eq!(file["lossless"], false);
        let name = file["generatedName"].as_str().unwrap();
        assert!(name.ends_with(".webp"));
        assert_eq!(file["url"], format!("/converted/{}", name));
    }
}

#[tokio::test]
async fn test_converted_file_is_served() {
    let app = setup_test_app().await;
    let client = app.client();

    let body = convert(
        client,
        vec![("cat.png", create_test_png(20, 20), "image/png")],
        None,
    )
    .await;
    let url = body["files"][0]["url"].as_str().unwrap().to_string();
    let size = body["files"][0]["convertedSize"].as_u64().unwrap();

    let response = client.get(&url).await;
    assert_eq!(response.status_code(), 200);
    let bytes = response.as_bytes();
    assert_eq!(bytes.len() as u64, size);
    assert_eq!(&bytes[8..12], b"WEBP");
}

#[tokio::test]
async fn test_quality_100_produces_lossless_webp() {
    // A 1000x1000 gradient PNG is larger than the default test upload limit
    let app = setup_test_app_with(DeliveryMode::Disk, |config| {
        config.max_file_size_bytes = 16 * 1024 * 1024;
    })
    .await;

    let body = convert(
        app.client(),
        vec![("big.png", create_test_png(1000, 1000), "image/png")],
        Some("100"),
    )
    .await;

    let file = &body["files"][0];
    assert_eq!(file["lossless"], true);
    assert_eq!(file["format"], "webp");
    assert_eq!(file["width"], 1000);
    assert_eq!(file["height"], 1000);
}

#[tokio::test]
async fn test_out_of_range_quality_is_clamped() {
    let app = setup_test_app().await;

    let body = convert(
        app.client(),
        vec![("a.png", create_test_png(8, 8), "image/png")],
        Some("150"),
    )
    .await;
    assert_eq!(body["files"][0]["lossless"], true);

    let body = convert(
        app.client(),
        vec![("a.png", create_test_png(8, 8), "image/png")],
        Some("not-a-number"),
    )
    .await;
    assert_eq!(body["files"][0]["lossless"], false);
}

#[tokio::test]
async fn test_disallowed_declared_type_fails_only_that_file() {
    let app = setup_test_app().await;

    let body = convert(
        app.client(),
        vec![
            ("report.pdf", b"%PDF-1.4".to_vec(), "application/pdf"),
            ("ok.png", create_test_png(8, 8), "image/png"),
        ],
        None,
    )
    .await;

    assert_eq!(body["stats"]["successful"], 1);
    assert_eq!(body["errors"][0]["file"], "report.pdf");
    assert_eq!(body["errors"][0]["reason"], "unsupported_format");
}

#[tokio::test]
async fn test_no_files_is_bad_request() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("quality", "80");
    let response = app.client().post("/api/convert").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No files were uploaded");
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/convert")
        .json(&serde_json::json!({ "images": [] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_too_many_files_is_rejected() {
    let app = setup_test_app().await;

    let mut form = MultipartForm::new();
    for i in 0..4 {
        form = form.add_part(
            "images",
            file_part(create_test_png(4, 4), &format!("{}.png", i), "image/png"),
        );
    }
    let response = app.client().post("/api/convert").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "TOO_MANY_FILES");
    assert_eq!(app.state.storage.as_ref().unwrap().converted_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "images",
        file_part(vec![0u8; TEST_MAX_FILE_SIZE + 1], "huge.png", "image/png"),
    );
    let response = app.client().post("/api/convert").multipart(form).await;

    assert_eq!(response.status_code(), 413);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_inline_mode_returns_data_urls_and_stores_nothing() {
    let app = setup_test_app_with_mode(DeliveryMode::Inline).await;

    let body = convert(
        app.client(),
        vec![("cat.png", create_test_png(16, 16), "image/png")],
        None,
    )
    .await;

    let url = body["files"][0]["url"].as_str().unwrap();
    assert!(url.starts_with("data:image/webp;base64,"));
    assert!(app.state.storage.is_none());
}

#[tokio::test]
async fn test_same_name_uploads_get_unique_names() {
    let app = setup_test_app().await;

    let body = convert(
        app.client(),
        vec![
            ("dup.png", create_test_png(8, 8), "image/png"),
            ("dup.png", create_test_png(8, 8), "image/png"),
            ("dup.png", create_test_png(8, 8), "image/png"),
        ],
        None,
    )
    .await;

    let names: std::collections::HashSet<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["generatedName"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn test_batch_past_request_timeout_still_returns_aggregate() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&temp_dir, DeliveryMode::Disk);
    config.0.base.request_timeout_secs = 1;

    let area = Arc::new(
        StorageArea::new(config.incoming_dir(), config.converted_dir())
            .await
            .unwrap(),
    );
    let sink = Arc::new(StallingSink {
        inner: DiskSink::new(area.clone()),
        delay: Duration::from_millis(1500),
    });
    let validator = Arc::new(UploadValidator::new(
        config.max_file_size_bytes(),
        config.max_files(),
        config.allowed_content_types().to_vec(),
    ));
    let worker = ConversionWorker::new(Arc::new(WebpCodec::new(1)), sink)
        .with_validator(validator.clone());
    let state = Arc::new(AppState {
        coordinator: BatchCoordinator::new(worker, 4, config.conversion_timeout()),
        validator,
        storage: Some(area.clone()),
        started_at: Instant::now(),
        shutdown: CancellationToken::new(),
        config: config.clone(),
    });
    let app = serve_state(&config, state, temp_dir).await;

    let form = MultipartForm::new()
        .add_part("images", file_part(create_test_png(8, 8), "late.png", "image/png"));
    let response = app.client().post("/api/convert").multipart(form).await;

    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["stats"]["failed"], 1);
    assert_eq!(body["errors"][0]["file"], "late.png");
    assert_eq!(body["errors"][0]["reason"], "timeout");

    // The abandoned conversion never writes an artifact
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let leftovers = std::fs::read_dir(area.converted_dir()).unwrap().count();
    assert_eq!(leftovers, 0);
}
