use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One uploaded file, owned by the request that carried it.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub original_name: String,
    /// Declared MIME type from the multipart part, if any
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(
        data: impl Into<Bytes>,
        original_name: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            data: data.into(),
            original_name: original_name.into(),
            content_type,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Why a single item of a batch could not be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UnsupportedFormat,
    DecodeError,
    Timeout,
    InternalError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::UnsupportedFormat => "unsupported_format",
            FailureReason::DecodeError => "decode_error",
            FailureReason::Timeout => "timeout",
            FailureReason::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully converted image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub original_name: String,
    pub generated_name: String,
    pub original_size: u64,
    pub converted_size: u64,
    /// Percentage saved relative to the original; negative when the output grew
    pub reduction_percent: i64,
    /// `/converted/{name}` in disk mode, a `data:image/webp;base64,` URL inline
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub lossless: bool,
}

/// A per-item failure. Never carries partial output.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, thiserror::Error)]
#[error("{file}: {error}")]
pub struct ConversionFailure {
    pub file: String,
    pub error: String,
    pub reason: FailureReason,
}

impl ConversionFailure {
    pub fn new(file: impl Into<String>, reason: FailureReason, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            error: error.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub processing_time_ms: u64,
}

/// Aggregate of one batch: every input maps to exactly one success or failure.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// In input order
    pub successes: Vec<ConversionResult>,
    pub failures: Vec<ConversionFailure>,
    pub stats: BatchStats,
}

impl BatchOutcome {
    pub fn new(
        successes: Vec<ConversionResult>,
        failures: Vec<ConversionFailure>,
        processing_time_ms: u64,
    ) -> Self {
        let stats = BatchStats {
            total: successes.len() + failures.len(),
            successful: successes.len(),
            failed: failures.len(),
            processing_time_ms,
        };
        Self {
            successes,
            failures,
            stats,
        }
    }
}
