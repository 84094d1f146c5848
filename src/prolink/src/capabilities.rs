//! Capability map codec.
//!
//! Values are arbitrary JSON; on the wire each one is its JSON text as UTF-8 bytes, keyed by
//! the capability name.

use prolink_types::CapabilityBytes;
use serde_json::{Map, Value};

use crate::errors::{DecodeError, EncodeError};

pub fn encode_capabilities(
    capabilities: &Map<String, Value>,
    max_entries: usize,
) -> Result<CapabilityBytes, EncodeError> {
    if capabilities.len() > max_entries {
        return Err(EncodeError::TooManyEntries {
            what: "capabilities",
            count: capabilities.len(),
            max: max_entries,
        });
    }
    let mut out = CapabilityBytes::new();
    for (key, value) in capabilities {
        let json = serde_json::to_vec(value).map_err(|err| EncodeError::CapabilityEncode {
            key: key.clone(),
            reason: err.to_string(),
        })?;
        out.insert(key.clone(), json);
    }
    Ok(out)
}

pub fn decode_capabilities(capabilities: &CapabilityBytes) -> Result<Map<String, Value>, DecodeError> {
    let mut out = Map::new();
    for (key, raw) in capabilities {
        let text = std::str::from_utf8(raw).map_err(|err| DecodeError::CapabilityDecode {
            key: key.clone(),
            reason: err.to_string(),
        })?;
        let value: Value = serde_json::from_str(text).map_err(|err| DecodeError::CapabilityDecode {
            key: key.clone(),
            reason: err.to_string(),
        })?;
        out.insert(key.clone(), value);
    }
    Ok(out)
}
