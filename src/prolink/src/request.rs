//! Decoded request form exchanged with callers, plus params validation shared by the shortcuts.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::EncodeError,
    primitives::{encode_address, parse_chain_id},
};

pub const WALLET_SEND_CALLS: &str = "wallet_sendCalls";
pub const WALLET_SIGN: &str = "wallet_sign";

/// A wallet JSON-RPC request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Map<String, Value>>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            chain_id: None,
            capabilities: None,
        }
    }

    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Map<String, Value>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

/// The single params object of `wallet_sendCalls` / `wallet_sign`.
pub(crate) fn single_params<'a>(
    method: &str,
    params: &'a Value,
) -> Result<&'a Map<String, Value>, EncodeError> {
    let entries = match params.as_array() {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            return Err(EncodeError::MissingParamsArray {
                method: method.to_string(),
            })
        }
    };
    if entries.len() != 1 {
        return Err(EncodeError::InvalidParams(format!(
            "{method} takes exactly one params object, got {}",
            entries.len()
        )));
    }
    entries[0]
        .as_object()
        .ok_or_else(|| EncodeError::InvalidParams(format!("{method} params[0] must be an object")))
}

pub(crate) fn params_chain_id(method: &str, params: &Map<String, Value>) -> Result<u64, EncodeError> {
    match params.get("chainId") {
        None | Some(Value::Null) => Err(EncodeError::MissingChainId {
            method: method.to_string(),
        }),
        Some(value) => parse_chain_id(value),
    }
}

pub(crate) fn optional_address(value: Option<&Value>) -> Result<Option<Address>, EncodeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => encode_address(s).map(Some),
        Some(other) => Err(EncodeError::InvalidParams(format!("expected address, got {other}"))),
    }
}

pub(crate) fn optional_string(
    value: Option<&Value>,
    field: &str,
    default: &str,
) -> Result<String, EncodeError> {
    match value {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(EncodeError::InvalidParams(format!("{field} must be a string, got {other}"))),
    }
}

/// True when every key of `object` is one of `allowed`.
pub(crate) fn keys_within(object: &Map<String, Value>, allowed: &[&str]) -> bool {
    object.keys().all(|key| allowed.contains(&key.as_str()))
}

/// True when `object` has exactly the keys in `expected`.
pub(crate) fn has_exact_keys(object: &Map<String, Value>, expected: &[&str]) -> bool {
    object.len() == expected.len() && keys_within(object, expected)
}
