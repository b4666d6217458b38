//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Extra bytes allowed on top of `max_files * max_file_size` for multipart
/// boundaries, part headers and the quality field.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Upper bound for the storage probe in the health check
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 2;

/// In-flight HTTP requests; conversions are additionally bounded by the coordinator
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
