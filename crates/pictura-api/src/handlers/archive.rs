//! ZIP download of previously converted images.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use pictura_core::constants::ARCHIVE_FILENAME;
use pictura_core::AppError;
use pictura_services::{build_archive, ArchiveEntry};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// A converted image the client still holds as a data URL (inline mode)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InlineFile {
    pub name: String,
    pub data_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadZipRequest {
    /// Generated names of stored artifacts
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub files_data: Vec<InlineFile>,
}

impl DownloadZipRequest {
    fn into_entries(self) -> Vec<ArchiveEntry> {
        self.files
            .into_iter()
            .map(ArchiveEntry::stored)
            .chain(
                self.files_data
                    .into_iter()
                    .map(|f| ArchiveEntry::data_url(f.name, f.data_url)),
            )
            .collect()
    }
}

#[utoipa::path(
    post,
    path = "/api/download-zip",
    tag = "conversion",
    request_body = DownloadZipRequest,
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 400, description = "No files specified", body = ErrorResponse),
        (status = 404, description = "None of the requested files could be found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        stored = request.files.len(),
        inline = request.files_data.len(),
        operation = "download_zip"
    )
)]
pub async fn download_zip(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<DownloadZipRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.files.is_empty() && request.files_data.is_empty() {
        return Err(AppError::BadRequest("No files specified".to_string()).into());
    }

    let archive = build_archive(request.into_entries(), state.storage.as_deref()).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", ARCHIVE_FILENAME),
        )
        .header(header::CONTENT_LENGTH, archive.len())
        .body(Body::from(archive))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build archive response");
            AppError::Internal(format!("Failed to build response: {}", e))
        })?;

    Ok(response)
}
