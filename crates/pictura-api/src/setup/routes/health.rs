//! Health check handler and response type.

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use pictura_core::constants::SERVICE_NAME;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    /// `healthy`, an error description, or `inline` when nothing is stored on disk
    pub storage: String,
}

pub(super) fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheckResponse),
        (status = 503, description = "Storage is unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match &state.storage {
        Some(area) => {
            run_check(
                Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
                async { area.converted_count().await.map(|_| ()) },
                "unavailable",
            )
            .await
        }
        None => "inline".to_string(),
    };

    let healthy = storage == "healthy" || storage == "inline";
    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(storage = %storage, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            service: SERVICE_NAME.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: state.uptime_seconds(),
            storage,
        }),
    )
}
