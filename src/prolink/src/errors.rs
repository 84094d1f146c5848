//! Error kinds for both directions of the codec.
//!
//! Encode errors are caller-fixable validation failures. Decode errors mean the payload is
//! corrupt, foreign, or not in canonical form. Neither is retried or coerced.

use thiserror::Error;

/// Errors raised while validating and encoding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("request method must not be empty")]
    EmptyMethod,

    #[error("{method} requires params array")]
    MissingParamsArray { method: String },

    #[error("{method} requires chainId")]
    MissingChainId { method: String },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("unsupported signature type {0}, only EIP-712 (0x01) is supported")]
    UnsupportedSignType(String),

    #[error("chain id mismatch: request uses {request}, typed data domain uses {domain}")]
    ChainIdMismatch { request: u64, domain: u64 },

    #[error("chain id conflict: request names {request}, params name {params}")]
    ChainIdConflict { request: u64, params: u64 },

    #[error("capability `{key}` could not be encoded: {reason}")]
    CapabilityEncode { key: String, reason: String },

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("invalid hex string `{0}`")]
    InvalidHex(String),

    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidAddressLength(usize),

    #[error("field of {len} bytes exceeds maximum of {max}")]
    FieldTooLarge { len: usize, max: usize },

    #[error("{what}: {count} entries exceeds maximum of {max}")]
    TooManyEntries { what: &'static str, count: usize, max: usize },

    #[error("encoded record of {len} bytes exceeds maximum of {max}")]
    RecordTooLarge { len: usize, max: usize },

    #[error("payload of {len} characters exceeds maximum of {max}")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Errors raised while decoding a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not valid base64url")]
    InvalidBase64url,

    #[error("payload of {len} bytes exceeds maximum of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("unknown compression flag {0:#04x}")]
    UnknownCompression(u8),

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("unsupported protocol version {0}")]
    UnsupportedProtocolVersion(u8),

    #[error("payload truncated")]
    Truncated,

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidAddressLength(usize),

    #[error("amount encoding has non-canonical leading zero bytes")]
    LeadingZeroBytes,

    #[error("field of {len} bytes exceeds maximum of {max}")]
    FieldTooLarge { len: usize, max: usize },

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("invalid option marker {0:#04x}")]
    InvalidOptionFlag(u8),

    #[error("capability `{key}` could not be decoded: {reason}")]
    CapabilityDecode { key: String, reason: String },

    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("params could not be parsed: {0}")]
    ParamsParse(String),

    #[error("typed data could not be parsed: {0}")]
    TypedDataParse(String),

    #[error("unknown {union} variant {tag:#04x}")]
    UnknownVariant { union: &'static str, tag: u8 },

    #[error("{what}: {count} entries exceeds maximum of {max}")]
    TooManyEntries { what: &'static str, count: usize, max: usize },
}
