//! Key material decoding

use crate::error::{CloudError, Result};
use base64::Engine;

/// Decode base64 key material into the credentials file content
pub fn decode_key_material(encoded: &str) -> Result<String> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| CloudError::DecodeFailed(format!("invalid base64: {}", e)))?;

    String::from_utf8(decoded)
        .map_err(|e| CloudError::DecodeFailed(format!("invalid UTF-8 in key material: {}", e)))
}
