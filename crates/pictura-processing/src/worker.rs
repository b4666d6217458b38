use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use pictura_core::constants::OUTPUT_FORMAT_TAG;
use pictura_core::models::{ConversionFailure, ConversionResult, FailureReason, UploadedImage};

use crate::codec::ImageCodec;
use crate::naming::generate_name;
use crate::quality::Quality;
use crate::sink::ArtifactSink;
use crate::validator::UploadValidator;

/// Converts one uploaded image and hands the result to a sink.
///
/// Every problem is reported as a [`ConversionFailure`] attributed to the
/// item; nothing escapes as a panic or a request-level error.
#[derive(Clone)]
pub struct ConversionWorker {
    codec: Arc<dyn ImageCodec>,
    sink: Arc<dyn ArtifactSink>,
    validator: Option<Arc<UploadValidator>>,
}

impl ConversionWorker {
    pub fn new(codec: Arc<dyn ImageCodec>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            codec,
            sink,
            validator: None,
        }
    }

    /// Reject items whose declared MIME type is outside the validator's allowlist.
    pub fn with_validator(mut self, validator: Arc<UploadValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn sink(&self) -> &Arc<dyn ArtifactSink> {
        &self.sink
    }

    #[tracing::instrument(
        skip(self, image),
        fields(file = %image.original_name, size_bytes = image.size_bytes(), quality = quality.value())
    )]
    pub async fn convert(
        &self,
        image: UploadedImage,
        quality: Quality,
    ) -> Result<ConversionResult, ConversionFailure> {
        let start = Instant::now();
        let UploadedImage {
            data,
            original_name,
            content_type,
        } = image;
        let original_size = data.len() as u64;

        if let (Some(validator), Some(content_type)) = (&self.validator, content_type.as_deref()) {
            validator.validate_content_type(content_type).map_err(|e| {
                ConversionFailure::new(&original_name, FailureReason::UnsupportedFormat, e.to_string())
            })?;
        }

        let codec = self.codec.clone();
        let encoded = tokio::task::spawn_blocking(move || codec.to_webp(&data, quality))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Codec task aborted");
                ConversionFailure::new(
                    &original_name,
                    FailureReason::InternalError,
                    "Image conversion aborted unexpectedly",
                )
            })?
            .map_err(|e| {
                tracing::debug!(error = %e, "Codec rejected image");
                ConversionFailure::new(&original_name, e.failure_reason(), e.to_string())
            })?;

        let generated_name = generate_name(&original_name);
        let converted_size = encoded.data.len() as u64;

        let url = self
            .sink
            .deliver(&generated_name, Bytes::from(encoded.data))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, name = %generated_name, "Failed to deliver artifact");
                ConversionFailure::new(
                    &original_name,
                    FailureReason::InternalError,
                    "Failed to store converted image",
                )
            })?;

        let reduction = reduction_percent(original_size, converted_size);

        tracing::info!(
            generated_name = %generated_name,
            original_size,
            converted_size,
            reduction_percent = reduction,
            lossless = encoded.lossless,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image converted"
        );

        Ok(ConversionResult {
            original_name,
            generated_name,
            original_size,
            converted_size,
            reduction_percent: reduction,
            url,
            width: encoded.width,
            height: encoded.height,
            format: OUTPUT_FORMAT_TAG.to_string(),
            lossless: encoded.lossless,
        })
    }
}

/// Whole-percent size saving, rounded half away from zero. Negative when the
/// output is larger than the input.
pub fn reduction_percent(original: u64, converted: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - converted as f64 / original as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{test_images, WebpCodec};
    use crate::sink::{DiskSink, InlineSink};
    use pictura_storage::StorageArea;
    use tempfile::tempdir;

    fn inline_worker() -> ConversionWorker {
        ConversionWorker::new(Arc::new(WebpCodec::default()), Arc::new(InlineSink))
    }

    #[test]
    fn test_reduction_percent() {
        assert_eq!(reduction_percent(1000, 400), 60);
        assert_eq!(reduction_percent(1000, 1000), 0);
        assert_eq!(reduction_percent(1000, 1500), -50);
        // Halves round away from zero
        assert_eq!(reduction_percent(8, 7), 13);
        assert_eq!(reduction_percent(8, 9), -13);
        assert_eq!(reduction_percent(0, 10), 0);
    }

    #[tokio::test]
    async fn test_convert_inline() {
        let png = test_images::png(32, 24);
        let original_size = png.len() as u64;
        let result = inline_worker()
            .convert(
                UploadedImage::new(png, "my photo.png", Some("image/png".to_string())),
                Quality::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.original_name, "my photo.png");
        assert!(result.generated_name.ends_with("_my_photo.webp"));
        assert_eq!(result.original_size, original_size);
        assert_eq!((result.width, result.height), (32, 24));
        assert_eq!(result.format, "webp");
        assert!(!result.lossless);
        assert!(result.url.starts_with("data:image/webp;base64,"));
        assert_eq!(
            result.reduction_percent,
            reduction_percent(result.original_size, result.converted_size)
        );
    }

    #[tokio::test]
    async fn test_convert_to_disk() {
        let dir = tempdir().unwrap();
        let area = Arc::new(
            StorageArea::new(dir.path().join("incoming"), dir.path().join("converted"))
                .await
                .unwrap(),
        );
        let worker =
            ConversionWorker::new(Arc::new(WebpCodec::default()), Arc::new(DiskSink::new(area.clone())));

        let result = worker
            .convert(
                UploadedImage::new(test_images::jpeg(20, 20), "cat.jpg", None),
                Quality::new(70),
            )
            .await
            .unwrap();

        assert_eq!(result.url, format!("/converted/{}", result.generated_name));
        let stored = area.read_converted(&result.generated_name).await.unwrap();
        assert_eq!(stored.len() as u64, result.converted_size);
    }

    #[tokio::test]
    async fn test_zero_byte_file_fails_with_decode_error() {
        let failure = inline_worker()
            .convert(UploadedImage::new(Vec::new(), "empty.png", None), Quality::default())
            .await
            .unwrap_err();
        assert_eq!(failure.file, "empty.png");
        assert_eq!(failure.reason, FailureReason::DecodeError);
    }

    #[tokio::test]
    async fn test_disallowed_declared_type_is_unsupported() {
        let validator = Arc::new(UploadValidator::new(
            1024 * 1024,
            10,
            vec!["image/png".to_string()],
        ));
        let worker = inline_worker().with_validator(validator);

        let failure = worker
            .convert(
                UploadedImage::new(
                    test_images::png(4, 4),
                    "doc.pdf",
                    Some("application/pdf".to_string()),
                ),
                Quality::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(failure.reason, FailureReason::UnsupportedFormat);
    }
}
