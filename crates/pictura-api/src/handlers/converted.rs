use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use pictura_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/api/converted/{filename}",
    tag = "conversion",
    params(
        ("filename" = String, Path, description = "Generated name of a converted image")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_converted"))]
pub async fn delete_converted(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let Some(area) = state.storage.as_ref() else {
        return Err(AppError::NotFound(format!("File not found: {}", filename)).into());
    };

    area.delete_converted(&filename).await?;

    tracing::info!(file = %filename, "Converted file deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "File deleted successfully".to_string(),
    }))
}
