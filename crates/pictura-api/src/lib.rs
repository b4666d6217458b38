//! Pictura API Library
//!
//! HTTP handlers, error mapping, application state and setup for the WebP
//! conversion service. The binary in `main.rs` only loads configuration and
//! calls into [`setup`].

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
