//! Compact, canonical binary encoding of wallet JSON-RPC requests.
//!
//! A [`Request`] is mapped onto a tagged [`Envelope`]: `wallet_sendCalls` (EIP-5792) and
//! `wallet_sign` (EIP-7871 over EIP-712) get dense shortcut payloads for their common shapes,
//! everything else is carried as generic JSON-RPC. The binary record is optionally
//! zstd-compressed and then base64url-encoded so it fits in a QR code or a universal link.
//!
//! ```text
//! Request -> Envelope -> record bytes -> flag ++ (raw | zstd) -> base64url
//! ```

pub mod capabilities;
pub mod compression;
pub mod decoder;
mod dispatch;
pub mod encoder;
pub mod errors;
pub mod limits;
pub mod link;
pub mod primitives;
pub mod request;
pub mod shortcuts;
pub mod transport;
pub mod utils;


use log::debug;

pub use errors::{DecodeError, EncodeError};
pub use limits::{CodecLimits, EncodeOptions};
pub use link::{payload_from_link, to_universal_link, LinkEnvironment};
pub use prolink_types;
pub use prolink_types::Envelope;
pub use request::Request;

/// Encode a request into a base64url payload with default options.
pub fn encode(request: &Request) -> Result<String, EncodeError> {
    encode_with_options(request, &EncodeOptions::default())
}

pub fn encode_with_options(request: &Request, options: &EncodeOptions) -> Result<String, EncodeError> {
    let envelope = dispatch::build_envelope(request, options)?;
    let record = encoder::encode_record(&envelope)?;
    if record.len() > options.limits.max_record_len {
        return Err(EncodeError::RecordTooLarge {
            len: record.len(),
            max: options.limits.max_record_len,
        });
    }
    debug!(
        "encoded {} as {:?} shortcut, record {} bytes",
        request.method,
        envelope.shortcut.tag(),
        record.len()
    );
    let framed = compression::frame(&record, options.compress);
    let payload = transport::encode_base64url(&framed);
    if payload.len() > options.limits.max_payload_len {
        return Err(EncodeError::PayloadTooLarge {
            len: payload.len(),
            max: options.limits.max_payload_len,
        });
    }
    Ok(payload)
}

/// Decode a base64url payload back into a request with default limits.
pub fn decode(payload: &str) -> Result<Request, DecodeError> {
    decode_with_limits(payload, &CodecLimits::default())
}

pub fn decode_with_limits(payload: &str, limits: &CodecLimits) -> Result<Request, DecodeError> {
    let envelope = decode_envelope(payload, limits)?;
    dispatch::request_from_envelope(&envelope)
}

/// Decode a payload only as far as its envelope, without rebuilding the JSON request.
pub fn decode_envelope(payload: &str, limits: &CodecLimits) -> Result<Envelope, DecodeError> {
    let framed = transport::decode_base64url(payload, limits.max_payload_len)?;
    let record = compression::unframe(&framed, limits.max_record_len)?;
    debug!(
        "decoding record of {} bytes (compression flag {:#04x})",
        record.len(),
        framed.first().copied().unwrap_or_default()
    );
    decoder::decode_record_with_limits(&record, limits)
}
