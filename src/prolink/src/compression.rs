//! Compression framing: one flag byte, then the record either raw or zstd-compressed.
//!
//! The engine is a process-wide singleton initialized on first use. After that every call is
//! synchronous and holds no shared mutable state, so encode/decode may run concurrently.

use std::{io::Read, sync::OnceLock};

use log::{debug, warn};
use prolink_types::CompressionFlag;

use crate::errors::DecodeError;

/// High ratio is cheap here: records are small and compression is one-shot.
pub const COMPRESSION_LEVEL: i32 = 19;

static ENGINE: OnceLock<CompressionEngine> = OnceLock::new();

#[derive(Debug)]
pub struct CompressionEngine {
    level: i32,
}

/// Shared engine; the first caller initializes it, concurrent first callers wait on the guard.
pub fn engine() -> &'static CompressionEngine {
    ENGINE.get_or_init(|| {
        debug!("initializing zstd compression engine (level {COMPRESSION_LEVEL})");
        CompressionEngine {
            level: COMPRESSION_LEVEL,
        }
    })
}

impl CompressionEngine {
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        zstd::bulk::compress(data, self.level)
    }

    /// Decompress, failing as soon as the output would exceed `limit` bytes.
    pub fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
        let mut decoder = zstd::stream::read::Decoder::new(data)
            .map_err(|err| DecodeError::Decompression(err.to_string()))?;
        let mut out = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = decoder
                .read(&mut buf)
                .map_err(|err| DecodeError::Decompression(err.to_string()))?;
            if n == 0 {
                break;
            }
            if out.len() + n > limit {
                return Err(DecodeError::PayloadTooLarge {
                    len: out.len() + n,
                    max: limit,
                });
            }
            out.extend_from_slice(&buf[..n]);
        }
        Ok(out)
    }
}

/// Prefix the record with its compression flag, compressing only when it shrinks.
pub fn frame(record: &[u8], try_compress: bool) -> Vec<u8> {
    if try_compress {
        match engine().compress(record) {
            Ok(compressed) if compressed.len() < record.len() => {
                debug!(
                    "record compressed from {} to {} bytes",
                    record.len(),
                    compressed.len()
                );
                let mut out = Vec::with_capacity(1 + compressed.len());
                out.push(CompressionFlag::Zstd as u8);
                out.extend_from_slice(&compressed);
                return out;
            }
            Ok(_) => debug!("compression does not shrink {} byte record, sending raw", record.len()),
            Err(err) => warn!("zstd compression failed, sending raw record: {err}"),
        }
    }
    let mut out = Vec::with_capacity(1 + record.len());
    out.push(CompressionFlag::None as u8);
    out.extend_from_slice(record);
    out
}

/// Strip the flag byte and return the raw record.
pub fn unframe(bytes: &[u8], max_record_len: usize) -> Result<Vec<u8>, DecodeError> {
    let (&flag, body) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    let flag = CompressionFlag::try_from(flag).map_err(|_| DecodeError::UnknownCompression(flag))?;
    match flag {
        CompressionFlag::None => {
            if body.len() > max_record_len {
                return Err(DecodeError::PayloadTooLarge {
                    len: body.len(),
                    max: max_record_len,
                });
            }
            Ok(body.to_vec())
        }
        CompressionFlag::Zstd => engine().decompress(body, max_record_len),
    }
}
