use std::sync::Arc;
use std::time::Duration;

use pictura_storage::{StorageArea, SweepReport};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodically deletes artifacts older than `max_age` from the storage area.
#[derive(Clone)]
pub struct SweepService {
    area: Arc<StorageArea>,
    interval: Duration,
    max_age: Duration,
}

impl SweepService {
    pub fn new(area: Arc<StorageArea>, interval: Duration, max_age: Duration) -> Self {
        Self {
            area,
            interval,
            max_age,
        }
    }

    /// Start the background sweep loop. The first sweep runs one interval
    /// after start. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval_at(Instant::now() + self.interval, self.interval);
            sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = self.interval.as_secs(),
                max_age_secs = self.max_age.as_secs(),
                "Sweep service started"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Sweep service shutting down");
                        break;
                    }
                    _ = sweep_interval.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }

    /// One sweep pass. Per-file failures are logged and counted, never fatal.
    #[tracing::instrument(skip(self), fields(cleanup.max_age_secs = self.max_age.as_secs()))]
    pub async fn run_once(&self) -> SweepReport {
        tracing::debug!("Starting scheduled sweep of expired files");

        let report = self.area.sweep(self.max_age).await;

        if report.failed > 0 {
            tracing::warn!(
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                "Sweep completed with failures"
            );
        } else {
            tracing::info!(
                scanned = report.scanned,
                deleted = report.deleted,
                "Sweep completed"
            );
        }

        report
    }
}
