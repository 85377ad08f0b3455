//! # Base64 Encoding/Decoding
//!
//! Utilities for base64 encoding and decoding.

use base64::{engine::general_purpose, Engine as _};

/// Encode bytes to base64 URL-safe string (no padding).
pub fn b64u_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(content)
}

/// Decode base64 URL-safe string to bytes.
pub fn b64u_decode(b64u: &str) -> Result<Vec<u8>, Error> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(b64u)
        .map_err(|_| Error::FailToB64uDecode)
}

/// Decode an uploaded payload.
///
/// Browsers hand us standard (padded) base64, sometimes wrapped in a
/// `data:<mime>;base64,` prefix. URL-safe input is accepted as well.
pub fn b64_decode(content: &str) -> Result<Vec<u8>, Error> {
    let content = match content.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    };
    let content = content.trim();

    general_purpose::STANDARD
        .decode(content)
        .or_else(|_| b64u_decode(content.trim_end_matches('=')))
        .map_err(|_| Error::FailToB64Decode)
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToB64uDecode,
    FailToB64Decode,
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error
