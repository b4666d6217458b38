//! Application setup and initialization
//!
//! Kept out of main.rs so integration tests can build the same state and router.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use pictura_core::constants::SERVICE_NAME;
use pictura_core::Config;
use pictura_infra::{init_telemetry, LogFormat};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    init_telemetry(
        LogFormat::from_json_flag(config.log_json()),
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        config.environment(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
