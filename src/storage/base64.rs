//! Base64 image payloads and `data:` URLs

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 image data, accepting either a bare payload or a data URL
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let data = match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    };

    STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::Validation(format!("Invalid base64 image data: {}", e)))
}

/// Whether the value is an inline `data:image/...;base64,` payload rather than a URL
pub fn is_image_data_url(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("data:image/")
        && value
            .split_once(',')
            .map(|(header, _)| header.ends_with(";base64"))
            .unwrap_or(false)
}

/// Get the image format from base64 data URL prefix
pub fn get_format_from_data_url(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:image/")?;
    let end = rest.find(|c: char| c == ';' || c == ',')?;
    Some(&rest[..end])
}

/// Create a data URL from binary image data
pub fn create_data_url(data: &[u8], format: &str) -> String {
    format!("data:image/{};base64,{}", format, encode(data))
}
