//! Service initialization and application state setup

use crate::state::AppState;
use anyhow::{Context, Result};
use pictura_core::{Config, DeliveryMode};
use pictura_services::{
    ArtifactSink, BatchCoordinator, ConversionWorker, DiskSink, ImageCodec, InlineSink,
    StorageArea, SweepService, UploadValidator, WebpCodec,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Build the conversion pipeline for the configured delivery mode and start
/// the sweep service when artifacts are kept on disk.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let shutdown = CancellationToken::new();

    let validator = Arc::new(UploadValidator::new(
        config.max_file_size_bytes(),
        config.max_files(),
        config.allowed_content_types().to_vec(),
    ));

    let (storage, sink): (Option<Arc<StorageArea>>, Arc<dyn ArtifactSink>) =
        match config.delivery_mode() {
            DeliveryMode::Disk => {
                let area = Arc::new(
                    StorageArea::new(config.incoming_dir(), config.converted_dir())
                        .await
                        .context("Failed to prepare storage directories")?,
                );
                (Some(area.clone()), Arc::new(DiskSink::new(area)))
            }
            DeliveryMode::Inline => (None, Arc::new(InlineSink)),
        };

    if let Some(area) = &storage {
        if config.cleanup_enabled() {
            let sweep = Arc::new(SweepService::new(
                area.clone(),
                config.cleanup_interval(),
                config.file_max_age(),
            ));
            // Detached: the loop exits once `shutdown` is cancelled
            let _handle = sweep.start(shutdown.clone());
        } else {
            tracing::info!("Cleanup disabled; converted files are kept until deleted");
        }
    }

    let codec: Arc<dyn ImageCodec> = Arc::new(WebpCodec::new(config.webp_effort()));
    let worker = ConversionWorker::new(codec, sink).with_validator(validator.clone());
    let coordinator = BatchCoordinator::new(
        worker,
        config.max_concurrent_conversions(),
        config.conversion_timeout(),
    );

    tracing::info!(
        delivery_mode = %config.delivery_mode(),
        max_concurrent_conversions = config.max_concurrent_conversions(),
        conversion_timeout_secs = config.conversion_timeout().as_secs(),
        webp_effort = config.webp_effort(),
        "Conversion pipeline ready"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        coordinator,
        validator,
        storage,
        started_at: Instant::now(),
        shutdown,
    }))
}
