//! Multipart parsing for batch uploads

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use pictura_core::models::UploadedImage;
use pictura_core::AppError;
use pictura_services::UploadValidator;

use crate::error::HttpAppError;

/// Name of the optional text field carrying the requested quality
pub const QUALITY_FIELD: &str = "quality";

/// Everything read from one conversion request
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub images: Vec<UploadedImage>,
    pub quality: Option<String>,
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    // Body limit violations surface as multipart errors carrying 413
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!("Upload is too large: {}", err.body_text())).into();
    }
    AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text())).into()
}

/// Read a file part chunk by chunk, rejecting it as soon as it crosses the size limit.
async fn read_file_field(
    field: &mut Field<'_>,
    name: &str,
    validator: &UploadValidator,
) -> Result<Bytes, HttpAppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        validator.validate_file_size(name, buffer.len() + chunk.len())?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Collect every file part (any field name) plus the optional `quality` field.
///
/// Count and size limits reject the whole request; everything else is left to
/// the per-item conversion so one bad file cannot sink the batch.
pub async fn read_upload_batch(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<UploadBatch, HttpAppError> {
    let mut batch = UploadBatch::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            if field.name() == Some(QUALITY_FIELD) {
                batch.quality = Some(field.text().await.map_err(multipart_error)?);
            }
            continue;
        };

        validator.validate_file_count(batch.images.len() + 1)?;

        let content_type = field.content_type().map(str::to_string);
        let data = read_file_field(&mut field, &file_name, validator).await?;

        tracing::debug!(
            file = %file_name,
            size_bytes = data.len(),
            content_type = ?content_type,
            "Received upload"
        );

        batch
            .images
            .push(UploadedImage::new(data, file_name, content_type));
    }

    Ok(batch)
}
