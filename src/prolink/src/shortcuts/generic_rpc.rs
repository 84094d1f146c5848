//! Generic JSON-RPC fallback: method name plus the params as JSON text.

use prolink_types::GenericRpcPayload;
use serde_json::Value;

use crate::errors::{DecodeError, EncodeError};

pub const JSON_RPC_VERSION: &str = "2.0";

pub fn encode(method: &str, params: &Value) -> Result<GenericRpcPayload, EncodeError> {
    let params_json =
        serde_json::to_vec(params).map_err(|err| EncodeError::InvalidParams(err.to_string()))?;
    Ok(GenericRpcPayload {
        method: method.to_string(),
        params_json,
        rpc_version: JSON_RPC_VERSION.to_string(),
    })
}

/// Returns the method and its params.
pub fn decode(payload: &GenericRpcPayload) -> Result<(String, Value), DecodeError> {
    if payload.method.trim().is_empty() {
        return Err(DecodeError::NonCanonical("empty method"));
    }
    if payload.rpc_version != JSON_RPC_VERSION {
        return Err(DecodeError::NonCanonical("json-rpc version must be 2.0"));
    }
    let params = serde_json::from_slice(&payload.params_json)
        .map_err(|err| DecodeError::ParamsParse(err.to_string()))?;
    Ok((payload.method.clone(), params))
}
