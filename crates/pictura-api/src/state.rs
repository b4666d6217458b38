//! Application state shared by every handler.

use pictura_core::{Config, DeliveryMode};
use pictura_services::{BatchCoordinator, StorageArea, UploadValidator};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub config: Config,
    pub coordinator: BatchCoordinator,
    pub validator: Arc<UploadValidator>,
    /// Present only in disk delivery mode
    pub storage: Option<Arc<StorageArea>>,
    pub started_at: Instant,
    /// Cancelled on shutdown; background services watch it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.config.delivery_mode()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
