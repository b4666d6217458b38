//! Pictura Core Library
//!
//! This crate provides core domain models, error types, configuration and constants
//! that are shared across all Pictura components.

pub mod config;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ConverterConfig};
pub use delivery::DeliveryMode;
pub use error::{AppError, ErrorMetadata, LogLevel};
