//! Route configuration and setup.
//!
//! Conversion endpoints live in [domains](domains); the health check in [health](health).

mod domains;
pub(crate) mod health;

use crate::constants::{HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use pictura_core::constants::CONVERTED_URL_PREFIX;
use pictura_core::Config;
use pictura_infra::request_id_middleware;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // A full batch must fit; single files are capped again while streaming
    let body_limit = config
        .max_file_size_bytes()
        .saturating_mul(config.max_files())
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut timed = Router::new()
        .merge(domains::conversion_routes())
        .merge(domains::service_routes())
        .merge(health::health_routes());

    if let Some(area) = &state.storage {
        timed = timed.nest_service(CONVERTED_URL_PREFIX, ServeDir::new(area.converted_dir()));
    }

    let router = Router::new()
        .merge(domains::convert_routes())
        .merge(timed.layer(TimeoutLayer::new(config.request_timeout())));

    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        request_timeout_secs = config.request_timeout().as_secs(),
        "HTTP limits configured"
    );

    let app = router
        .fallback(not_found)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": "Not Found",
            "path": uri.path(),
        })),
    )
}
