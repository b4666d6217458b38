//! Artifact name validation shared by every storage operation.

use crate::error::{StorageError, StorageResult};

/// Rejects names that could escape the managed directory.
pub fn validate_artifact_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("File name is empty".to_string()));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StorageError::InvalidName(
            "File name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
