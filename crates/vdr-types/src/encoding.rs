//! Canonical compact text encoding used inside locators.
//!
//! Binary values (public keys, digests) are written as URL-safe base64
//! without padding, so they can sit in a query string without escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::TypeError;

/// Encode bytes as base64url without padding.
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url string written without padding.
pub fn decode_base64url(text: &str) -> Result<Vec<u8>, TypeError> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| TypeError::InvalidBase64(e.to_string()))
}
