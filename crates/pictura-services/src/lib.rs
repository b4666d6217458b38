//! Pictura Services Layer
//!
//! Business services that sit on top of processing and storage: the ZIP
//! archive builder and the background sweep of expired artifacts. The crate
//! also re-exports the processing and storage types the API needs, so the API
//! crate depends on a single service facade.

pub mod archive;
pub mod cleanup;

pub use archive::{build_archive, decode_data_url, ArchiveEntry, ArchiveError, ArchiveSource};
pub use cleanup::SweepService;
pub use pictura_processing::{
    ArtifactSink, BatchCoordinator, ConversionError, ConversionWorker, DiskSink, ImageCodec,
    InlineSink, Quality, SinkError, UploadValidator, ValidationError, WebpCodec,
};
pub use pictura_storage::{StorageArea, StorageError, StorageResult, SweepReport};
