//! Tracing initialization
//!
//! Logs go to stdout, either human readable or as JSON lines. Filtering follows
//! `RUST_LOG` when set.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
