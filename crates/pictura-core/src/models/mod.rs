//! Data models for the application
//!
//! Conversion inputs and outcomes live in `conversion`; artifacts that outlive a
//! single request live in `artifact`.

mod artifact;
mod conversion;

pub use artifact::StoredArtifact;
pub use conversion::{
    BatchOutcome, BatchStats, ConversionFailure, ConversionResult, FailureReason, UploadedImage,
};
