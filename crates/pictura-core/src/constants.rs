//! Service-wide constants

/// Service identifier reported by health and info endpoints
pub const SERVICE_NAME: &str = "pictura";

/// Human readable service title
pub const SERVICE_TITLE: &str = "WebP Conversion Service";

/// Quality used when the caller omits it or sends something unparseable
pub const DEFAULT_QUALITY: u8 = 85;

/// Lowest accepted quality; smaller values are clamped up
pub const MIN_QUALITY: u8 = 50;

/// Highest accepted quality. Requesting it switches the encoder to lossless mode.
pub const MAX_QUALITY: u8 = 100;

/// libwebp `method` (0 = fastest, 6 = smallest output)
pub const DEFAULT_WEBP_EFFORT: u8 = 6;

/// Extension of every generated artifact
pub const OUTPUT_EXTENSION: &str = "webp";

/// MIME type of every generated artifact
pub const OUTPUT_CONTENT_TYPE: &str = "image/webp";

/// Format tag reported in conversion results
pub const OUTPUT_FORMAT_TAG: &str = "webp";

/// Attachment filename used for ZIP downloads
pub const ARCHIVE_FILENAME: &str = "webp_images.zip";

/// URL prefix under which stored artifacts are served
pub const CONVERTED_URL_PREFIX: &str = "/converted";

/// Source formats the codec can decode (display names)
pub const SUPPORTED_SOURCE_FORMATS: &[&str] = &["JPEG", "PNG", "GIF", "BMP", "WEBP", "TIFF"];

/// Declared MIME types accepted for conversion
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/tiff",
];

/// Subdirectory of the storage root holding raw uploads
pub const INCOMING_DIR_NAME: &str = "incoming";

/// Subdirectory of the storage root holding converted artifacts
pub const CONVERTED_DIR_NAME: &str = "converted";
