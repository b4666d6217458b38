use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_upload_batch;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use pictura_core::models::{BatchStats, ConversionFailure, ConversionResult};
use pictura_core::AppError;
use pictura_services::Quality;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertResponse {
    pub success: bool,
    /// Converted images in upload order
    pub files: Vec<ConversionResult>,
    /// Per-file failures; never fail the request as a whole
    pub errors: Vec<ConversionFailure>,
    pub stats: BatchStats,
}

#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "conversion",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "One or more image file parts plus an optional `quality` field (50-100)"),
    responses(
        (status = 200, description = "Batch processed; individual failures are listed in `errors`", body = ConvertResponse),
        (status = 400, description = "No files, not multipart, or too many files", body = ErrorResponse),
        (status = 408, description = "The upload did not arrive within the request timeout", body = ErrorResponse),
        (status = 413, description = "A file exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "convert_images"))]
pub async fn convert_images(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    // This route is exempt from the timeout layer; the request timeout is
    // enforced here so a late batch still answers with its aggregate.
    let request_timeout = state.config.request_timeout();
    let deadline = tokio::time::Instant::now() + request_timeout;

    let batch = tokio::time::timeout_at(deadline, read_upload_batch(multipart?, &state.validator))
        .await
        .map_err(|_| {
            AppError::RequestTimeout(format!(
                "Upload did not complete within {} seconds",
                request_timeout.as_secs()
            ))
        })??;

    let default_quality = Quality::new(i64::from(state.config.default_quality()));
    let quality = Quality::from_param(batch.quality.as_deref(), default_quality);

    let outcome = state
        .coordinator
        .convert_batch_until(batch.images, quality, Some(deadline))
        .await?;

    Ok(Json(ConvertResponse {
        success: true,
        files: outcome.successes,
        errors: outcome.failures,
        stats: outcome.stats,
    }))
}
