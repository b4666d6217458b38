use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use pictura_core::models::StoredArtifact;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StorageError, StorageResult};
use crate::keys::validate_artifact_name;

/// Outcome of one sweep over the managed directories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl SweepReport {
    fn merge(&mut self, other: SweepReport) {
        self.scanned += other.scanned;
        self.deleted += other.deleted;
        self.failed += other.failed;
    }
}

/// The two ephemeral directories used by the service.
///
/// Writes need no locking: every artifact name is unique, so concurrent
/// conversions never touch the same path. A delete racing a read surfaces as
/// `NotFound` on the losing side.
#[derive(Debug, Clone)]
pub struct StorageArea {
    incoming_dir: PathBuf,
    converted_dir: PathBuf,
}

impl StorageArea {
    /// Create both directories if they do not exist yet.
    pub async fn new(
        incoming_dir: impl Into<PathBuf>,
        converted_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let incoming_dir = incoming_dir.into();
        let converted_dir = converted_dir.into();

        for dir in [&incoming_dir, &converted_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        tracing::info!(
            incoming = %incoming_dir.display(),
            converted = %converted_dir.display(),
            "Storage area ready"
        );

        Ok(Self {
            incoming_dir,
            converted_dir,
        })
    }

    pub fn incoming_dir(&self) -> &Path {
        &self.incoming_dir
    }

    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Resolve an artifact name to its path inside the converted directory.
    pub fn converted_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_artifact_name(name)?;
        Ok(self.converted_dir.join(name))
    }

    pub async fn store_converted(&self, name: &str, data: Bytes) -> StorageResult<StoredArtifact> {
        let path = self.converted_path(name)?;
        let size = data.len();
        let start = Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to flush file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            name = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored converted artifact"
        );

        Ok(StoredArtifact::new(name.to_string(), path, size as u64))
    }

    pub async fn read_converted(&self, name: &str) -> StorageResult<Bytes> {
        let path = self.converted_path(name)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Remove one artifact. Absent files (including a lost race with the
    /// sweeper) report `NotFound`.
    pub async fn delete_converted(&self, name: &str) -> StorageResult<()> {
        let path = self.converted_path(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), name = %name, "Deleted converted artifact");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Number of regular files currently held in the converted directory.
    pub async fn converted_count(&self) -> StorageResult<usize> {
        let mut entries = fs::read_dir(&self.converted_dir).await?;
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Delete every file older than `max_age` in both directories.
    pub async fn sweep(&self, max_age: Duration) -> SweepReport {
        self.sweep_at(SystemTime::now(), max_age).await
    }

    /// Sweep relative to an explicit `now`. Files whose modification time is
    /// strictly before `now - max_age` are removed.
    pub async fn sweep_at(&self, now: SystemTime, max_age: Duration) -> SweepReport {
        let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = SweepReport::default();

        for dir in [&self.incoming_dir, &self.converted_dir] {
            report.merge(sweep_dir(dir, cutoff).await);
        }

        report
    }
}

async fn sweep_dir(dir: &Path, cutoff: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, dir = %dir.display(), "Failed to read storage directory");
            report.failed += 1;
            return report;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, dir = %dir.display(), "Failed to iterate storage directory");
                report.failed += 1;
                break;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to stat file during sweep");
                report.failed += 1;
                continue;
            }
        };

        if !metadata.is_file() {
            continue;
        }
        report.scanned += 1;

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "File has no modification time");
                report.failed += 1;
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Swept expired file");
                report.deleted += 1;
            }
            // Someone else removed it first
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to delete expired file");
                report.failed += 1;
            }
        }
    }

    report
}
