//! Output file naming.
//!
//! Names look like `{unix_millis}_{token}_{stem}.webp`. The millisecond
//! timestamp plus a 6 character random token keeps names unique across
//! concurrent conversions of files that share an original name.

use std::path::Path;

use pictura_core::constants::OUTPUT_EXTENSION;
use rand::Rng;

const TOKEN_LEN: usize = 6;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_STEM_LEN: usize = 64;
const FALLBACK_STEM: &str = "image";

/// Reduce an original filename to a safe stem: extension dropped, anything
/// outside `[A-Za-z0-9_-]` replaced with `_`, capped in length.
pub fn sanitize_stem(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(original_name);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base);

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    if sanitized.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        sanitized
    }
}

fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Generate a fresh artifact name for `original_name`.
pub fn generate_name(original_name: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        chrono::Utc::now().timestamp_millis(),
        random_token(),
        sanitize_stem(original_name),
        OUTPUT_EXTENSION
    )
}
