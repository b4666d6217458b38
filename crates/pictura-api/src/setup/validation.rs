//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use pictura_core::{Config, DeliveryMode};

/// Validate critical configuration values.
///
/// Field-level checks live in `Config::validate`; this adds the checks that
/// only matter once the service is about to run.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        tracing::info!("Production mode: error details are withheld from responses");
    }

    if config.delivery_mode() == DeliveryMode::Inline && config.cleanup_enabled() {
        tracing::info!("Inline delivery keeps nothing on disk; the sweep service will not start");
    }

    if config.max_concurrent_conversions() > 64 {
        tracing::warn!(
            max_concurrent_conversions = config.max_concurrent_conversions(),
            "MAX_CONCURRENT_CONVERSIONS is very high - conversions are CPU bound"
        );
    }

    let max_batch_mb = config.max_file_size_mb().saturating_mul(config.max_files());
    if max_batch_mb > 4096 {
        tracing::warn!(
            max_batch_mb,
            "MAX_FILE_SIZE_MB x MAX_FILES allows very large request bodies held in memory"
        );
    }

    Ok(())
}
