//! Pictura Processing Library
//!
//! Everything between an uploaded payload and a delivered WebP artifact: the
//! codec, quality handling, output naming, artifact sinks, the per-file
//! conversion worker, and the batch coordinator that fans a request out over
//! many workers.

pub mod batch;
pub mod codec;
pub mod naming;
pub mod quality;
pub mod sink;
pub mod validator;
pub mod worker;

pub use batch::{BatchCoordinator, ConversionError};
pub use codec::{CodecError, EncodedImage, ImageCodec, WebpCodec};
pub use naming::{generate_name, sanitize_stem};
pub use quality::Quality;
pub use sink::{ArtifactSink, DiskSink, InlineSink, SinkError};
pub use validator::{UploadValidator, ValidationError};
pub use worker::ConversionWorker;
