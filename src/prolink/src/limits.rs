//! Decode-side bounds and encode options.
//!
//! Payloads arrive from QR codes and links, so every allocation the decoder makes is bounded
//! by these limits.

/// Default maximum length of the base64url payload text.
pub const MAX_PAYLOAD_LEN_DEFAULT: usize = 1 << 20;
/// Default maximum size of the (decompressed) envelope record.
pub const MAX_RECORD_LEN_DEFAULT: usize = 1 << 20;
/// Default maximum number of calls in a generic call bundle.
pub const MAX_CALLS_DEFAULT: usize = 1024;
/// Default maximum number of capability entries.
pub const MAX_CAPABILITIES_DEFAULT: usize = 64;

/// Size bounds applied by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecLimits {
    pub max_payload_len: usize,
    pub max_record_len: usize,
    pub max_calls: usize,
    pub max_capabilities: usize,
}

impl CodecLimits {
    pub const fn new() -> Self {
        Self {
            max_payload_len: MAX_PAYLOAD_LEN_DEFAULT,
            max_record_len: MAX_RECORD_LEN_DEFAULT,
            max_calls: MAX_CALLS_DEFAULT,
            max_capabilities: MAX_CAPABILITIES_DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_max_payload_len(mut self, max: usize) -> Self {
        self.max_payload_len = max;
        self
    }

    #[must_use]
    pub const fn with_max_record_len(mut self, max: usize) -> Self {
        self.max_record_len = max;
        self
    }

    #[must_use]
    pub const fn with_max_calls(mut self, max: usize) -> Self {
        self.max_calls = max;
        self
    }

    #[must_use]
    pub const fn with_max_capabilities(mut self, max: usize) -> Self {
        self.max_capabilities = max;
        self
    }
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`crate::encode_with_options`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Use the `wallet_sendCalls` / `wallet_sign` shortcuts when the method matches.
    /// When false every request goes through the generic JSON-RPC path.
    pub specialize: bool,
    /// Try compression and keep it when it makes the record smaller.
    pub compress: bool,
    pub limits: CodecLimits,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            specialize: true,
            compress: true,
            limits: CodecLimits::default(),
        }
    }
}
