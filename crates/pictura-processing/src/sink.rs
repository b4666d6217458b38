//! Where converted bytes go once encoded.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use pictura_core::constants::{CONVERTED_URL_PREFIX, OUTPUT_CONTENT_TYPE};
use pictura_core::DeliveryMode;
use pictura_storage::{StorageArea, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to store artifact: {0}")]
    Storage(#[from] StorageError),
}

/// Delivers an encoded artifact and returns the reference the caller uses to
/// retrieve it.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn deliver(&self, name: &str, data: Bytes) -> Result<String, SinkError>;

    fn mode(&self) -> DeliveryMode;
}

/// Persists artifacts in the converted area and answers with a relative URL.
#[derive(Clone)]
pub struct DiskSink {
    area: Arc<StorageArea>,
}

impl DiskSink {
    pub fn new(area: Arc<StorageArea>) -> Self {
        Self { area }
    }
}

#[async_trait]
impl ArtifactSink for DiskSink {
    async fn deliver(&self, name: &str, data: Bytes) -> Result<String, SinkError> {
        let artifact = self.area.store_converted(name, data).await?;
        Ok(format!("{}/{}", CONVERTED_URL_PREFIX, artifact.name))
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Disk
    }
}

/// Keeps nothing; the artifact travels back as a base64 data URL.
#[derive(Clone, Copy, Default)]
pub struct InlineSink;

pub fn to_data_url(data: &[u8]) -> String {
    format!("data:{};base64,{}", OUTPUT_CONTENT_TYPE, STANDARD.encode(data))
}

#[async_trait]
impl ArtifactSink for InlineSink {
    async fn deliver(&self, _name: &str, data: Bytes) -> Result<String, SinkError> {
        Ok(to_data_url(&data))
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Inline
    }
}
