//! Batch conversion: one task per file, bounded, each under its own timeout
//! and optionally under a shared batch deadline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pictura_core::models::{BatchOutcome, ConversionFailure, FailureReason, UploadedImage};
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::quality::Quality;
use crate::worker::ConversionWorker;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("No files were uploaded")]
    EmptyBatch,
}

/// Fans a batch out over [`ConversionWorker`] tasks and collects every result.
///
/// Partial failure never fails the batch: each item ends up as exactly one
/// success or one failure.
#[derive(Clone)]
pub struct BatchCoordinator {
    worker: ConversionWorker,
    semaphore: Arc<Semaphore>,
    item_timeout: Duration,
}

impl BatchCoordinator {
    pub fn new(worker: ConversionWorker, max_concurrent: usize, item_timeout: Duration) -> Self {
        Self {
            worker,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            item_timeout,
        }
    }

    pub fn worker(&self) -> &ConversionWorker {
        &self.worker
    }

    pub async fn convert_batch(
        &self,
        items: Vec<UploadedImage>,
        quality: Quality,
    ) -> Result<BatchOutcome, ConversionError> {
        self.convert_batch_until(items, quality, None).await
    }

    /// Like [`convert_batch`](Self::convert_batch), but every item still
    /// queued or running at `deadline` is abandoned and reported as a
    /// `Timeout` failure, so the aggregate is always ready by then.
    #[tracing::instrument(skip(self, items, deadline), fields(batch_size = items.len(), quality = quality.value()))]
    pub async fn convert_batch_until(
        &self,
        items: Vec<UploadedImage>,
        quality: Quality,
        deadline: Option<Instant>,
    ) -> Result<BatchOutcome, ConversionError> {
        if items.is_empty() {
            return Err(ConversionError::EmptyBatch);
        }

        let start = Instant::now();
        let names: Vec<String> = items.iter().map(|i| i.original_name.clone()).collect();

        let tasks = items.into_iter().map(|item| {
            let worker = self.worker.clone();
            let semaphore = self.semaphore.clone();
            let item_timeout = self.item_timeout;

            tokio::spawn(async move {
                let name = item.original_name.clone();
                let acquire = semaphore.acquire_owned();
                let permit = match deadline {
                    Some(deadline) => match tokio::time::timeout_at(deadline, acquire).await {
                        Ok(permit) => permit,
                        Err(_) => return Err(batch_deadline_failure(&name)),
                    },
                    None => acquire.await,
                };
                let _permit = permit.map_err(|_| {
                    ConversionFailure::new(
                        &name,
                        FailureReason::InternalError,
                        "Conversion pool is shut down",
                    )
                })?;

                // Timeout starts once a slot is free so queued items are not penalised
                let budget = match deadline {
                    Some(deadline) => {
                        item_timeout.min(deadline.saturating_duration_since(Instant::now()))
                    }
                    None => item_timeout,
                };

                match tokio::time::timeout(budget, worker.convert(item, quality)).await {
                    Ok(result) => result,
                    Err(_) if budget < item_timeout => Err(batch_deadline_failure(&name)),
                    Err(_) => {
                        tracing::warn!(
                            file = %name,
                            timeout_secs = item_timeout.as_secs_f64(),
                            "Conversion timed out"
                        );
                        Err(ConversionFailure::new(
                            &name,
                            FailureReason::Timeout,
                            format!(
                                "Conversion did not finish within {} seconds",
                                item_timeout.as_secs_f64()
                            ),
                        ))
                    }
                }
            })
        });

        let joined = join_all(tasks).await;

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (name, result) in names.into_iter().zip(joined) {
            match result {
                Ok(Ok(converted)) => successes.push(converted),
                Ok(Err(failure)) => failures.push(failure),
                Err(join_error) => {
                    tracing::error!(file = %name, error = %join_error, "Conversion task panicked");
                    failures.push(ConversionFailure::new(
                        name,
                        FailureReason::InternalError,
                        "Unexpected error while converting image",
                    ));
                }
            }
        }

        let outcome = BatchOutcome::new(successes, failures, start.elapsed().as_millis() as u64);

        tracing::info!(
            total = outcome.stats.total,
            successful = outcome.stats.successful,
            failed = outcome.stats.failed,
            processing_time_ms = outcome.stats.processing_time_ms,
            "Batch conversion finished"
        );

        Ok(outcome)
    }
}

fn batch_deadline_failure(name: &str) -> ConversionFailure {
    tracing::warn!(file = %name, "Conversion abandoned at the batch deadline");
    ConversionFailure::new(
        name,
        FailureReason::Timeout,
        "Conversion did not finish before the request deadline",
    )
}
