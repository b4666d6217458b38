use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A converted file kept in the converted area until it is deleted or expires.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArtifact {
    pub name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub fn new(name: String, path: PathBuf, size_bytes: u64) -> Self {
        Self {
            name,
            path,
            size_bytes,
            created_at: Utc::now(),
        }
    }
}
