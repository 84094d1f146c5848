//! base64url (RFC 4648 §5, no padding) transport encoding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::errors::DecodeError;

pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a payload string, rejecting it before decoding when longer than `max_len` characters.
pub fn decode_base64url(payload: &str, max_len: usize) -> Result<Vec<u8>, DecodeError> {
    let payload = payload.trim();
    if payload.len() > max_len {
        return Err(DecodeError::PayloadTooLarge {
            len: payload.len(),
            max: max_len,
        });
    }
    URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| DecodeError::InvalidBase64url)
}
