//! Raster decoding and WebP encoding.

use std::io::Cursor;
use std::os::raw::c_int;

use image::{ImageFormat, ImageReader};
use pictura_core::constants::DEFAULT_WEBP_EFFORT;
use pictura_core::models::FailureReason;

use crate::quality::Quality;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode WebP: {0}")]
    EncodeError(String),
}

impl CodecError {
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            CodecError::UnsupportedFormat(_) => FailureReason::UnsupportedFormat,
            CodecError::DecodeError(_) => FailureReason::DecodeError,
            CodecError::EncodeError(_) => FailureReason::InternalError,
        }
    }
}

/// A freshly encoded WebP image with the dimensions read back from its header.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub lossless: bool,
}

/// Converts one raw payload into WebP. Implementations are CPU bound and are
/// called from the blocking thread pool.
pub trait ImageCodec: Send + Sync {
    fn to_webp(&self, data: &[u8], quality: Quality) -> Result<EncodedImage, CodecError>;
}

/// libwebp-backed codec; decoding goes through the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct WebpCodec {
    effort: u8,
}

impl Default for WebpCodec {
    fn default() -> Self {
        Self {
            effort: DEFAULT_WEBP_EFFORT,
        }
    }
}

impl WebpCodec {
    /// `effort` maps to libwebp's `method` (0..=6).
    pub fn new(effort: u8) -> Self {
        Self {
            effort: effort.min(6),
        }
    }

    pub fn effort(&self) -> u8 {
        self.effort
    }

    fn sniff_format(data: &[u8]) -> Result<ImageFormat, CodecError> {
        if data.is_empty() {
            return Err(CodecError::DecodeError("Empty file".to_string()));
        }

        let format = image::guess_format(data).map_err(|_| {
            CodecError::UnsupportedFormat("content is not a recognised image".to_string())
        })?;

        match format {
            ImageFormat::Jpeg
            | ImageFormat::Png
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
            | ImageFormat::Tiff => Ok(format),
            other => Err(CodecError::UnsupportedFormat(format!("{:?}", other))),
        }
    }
}

impl ImageCodec for WebpCodec {
    fn to_webp(&self, data: &[u8], quality: Quality) -> Result<EncodedImage, CodecError> {
        let format = Self::sniff_format(data)?;

        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| CodecError::DecodeError(e.to_string()))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut config = webp::WebPConfig::new().map_err(|_| {
            CodecError::EncodeError("Failed to initialise WebP encoder config".to_string())
        })?;
        config.lossless = c_int::from(quality.is_lossless());
        config.quality = f32::from(quality.value());
        config.method = c_int::from(self.effort);

        let encoder = webp::Encoder::from_rgba(&rgba, width, height);
        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| CodecError::EncodeError(format!("{:?}", e)))?;
        let data = encoded.to_vec();

        let (width, height) = ImageReader::with_format(Cursor::new(&data[..]), ImageFormat::WebP)
            .into_dimensions()
            .map_err(|e| CodecError::EncodeError(format!("Unreadable WebP output: {}", e)))?;

        Ok(EncodedImage {
            data,
            width,
            height,
            lossless: quality.is_lossless(),
        })
    }
}
