mod service;

pub use service::{build_archive, decode_data_url, ArchiveEntry, ArchiveError, ArchiveSource};
