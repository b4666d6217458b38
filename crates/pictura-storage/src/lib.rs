//! Pictura Storage Library
//!
//! Ephemeral on-disk storage for the conversion service. Two directories are
//! managed: `incoming/` for raw uploads and `converted/` for WebP artifacts.
//! Artifacts are addressed by their generated file name only; names must not
//! contain path separators or `..`.

pub mod area;
pub mod error;
pub(crate) mod keys;

pub use area::{StorageArea, SweepReport};
pub use error::{StorageError, StorageResult};
pub use keys::validate_artifact_name;
