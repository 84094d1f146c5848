//! Request <-> envelope mapping: picks the shortcut on encode and rebuilds the request on decode.

use log::debug;
use prolink_types::{Envelope, ShortcutPayload};
use serde_json::{Map, Value};

use crate::{
    capabilities::{decode_capabilities, encode_capabilities},
    errors::{DecodeError, EncodeError},
    limits::EncodeOptions,
    request::{optional_address, params_chain_id, single_params, Request, WALLET_SEND_CALLS, WALLET_SIGN},
    shortcuts::{generic_rpc, wallet_send_calls, wallet_sign},
};

pub fn build_envelope(request: &Request, options: &EncodeOptions) -> Result<Envelope, EncodeError> {
    if request.method.trim().is_empty() {
        return Err(EncodeError::EmptyMethod);
    }

    let method = request.method.as_str();
    if method == WALLET_SEND_CALLS || method == WALLET_SIGN {
        let params = single_params(method, &request.params)?;
        let chain_id = params_chain_id(method, params)?;
        if method == WALLET_SIGN {
            wallet_sign::normalize_sign_type(params.get("type"))?;
            if let Some(data) = params.get("data") {
                wallet_sign::check_domain_chain_id(data, chain_id)?;
            }
        }
        if let Some(request_chain_id) = request.chain_id.filter(|chain| *chain != chain_id) {
            return Err(EncodeError::ChainIdConflict {
                request: request_chain_id,
                params: chain_id,
            });
        }

        if options.specialize && is_representable(method, params) {
            if let Some(capabilities) = specialized_capabilities(request, params) {
                return specialized_envelope(method, params, chain_id, capabilities, options);
            }
        }
        debug!("{method}: not representable as a shortcut, using generic json-rpc");
        return generic_envelope(request, chain_id, options);
    }

    let chain_id = request.chain_id.ok_or_else(|| EncodeError::MissingChainId {
        method: request.method.clone(),
    })?;
    generic_envelope(request, chain_id, options)
}

fn is_representable(method: &str, params: &Map<String, Value>) -> bool {
    if method == WALLET_SEND_CALLS {
        wallet_send_calls::is_representable(params)
    } else {
        wallet_sign::is_representable(params)
    }
}

/// Capabilities for a specialized request, or `None` when they cannot be carried losslessly.
fn specialized_capabilities<'a>(
    request: &'a Request,
    params: &'a Map<String, Value>,
) -> Option<Option<&'a Map<String, Value>>> {
    let in_params = match params.get("capabilities") {
        None => None,
        Some(Value::Object(capabilities)) => Some(capabilities),
        Some(_) => return None,
    };
    match (request.capabilities.as_ref(), in_params) {
        (Some(outer), Some(inner)) if outer != inner => None,
        (Some(outer), _) => Some(Some(outer)),
        (None, inner) => Some(inner),
    }
}

fn specialized_envelope(
    method: &str,
    params: &Map<String, Value>,
    chain_id: u64,
    capabilities: Option<&Map<String, Value>>,
    options: &EncodeOptions,
) -> Result<Envelope, EncodeError> {
    let (shortcut, from) = if method == WALLET_SEND_CALLS {
        let payload = wallet_send_calls::encode(params, &options.limits)?;
        (ShortcutPayload::WalletSendCalls(payload), None)
    } else {
        let payload = wallet_sign::encode(params, chain_id)?;
        (ShortcutPayload::WalletSign(payload), optional_address(params.get("from"))?)
    };

    let mut envelope = Envelope::new(chain_id, shortcut);
    envelope.from = from;
    envelope.capabilities = capabilities
        .map(|capabilities| encode_capabilities(capabilities, options.limits.max_capabilities))
        .transpose()?;
    Ok(envelope)
}

fn generic_envelope(request: &Request, chain_id: u64, options: &EncodeOptions) -> Result<Envelope, EncodeError> {
    let payload = generic_rpc::encode(&request.method, &request.params)?;
    let mut envelope = Envelope::new(chain_id, ShortcutPayload::GenericRpc(payload));
    envelope.capabilities = request
        .capabilities
        .as_ref()
        .map(|capabilities| encode_capabilities(capabilities, options.limits.max_capabilities))
        .transpose()?;
    Ok(envelope)
}

pub fn request_from_envelope(envelope: &Envelope) -> Result<Request, DecodeError> {
    let capabilities = envelope
        .capabilities
        .as_ref()
        .map(decode_capabilities)
        .transpose()?;
    let chain_id = envelope.chain_id;

    let (method, params) = match &envelope.shortcut {
        ShortcutPayload::GenericRpc(payload) => generic_rpc::decode(payload)?,
        ShortcutPayload::WalletSendCalls(payload) => (
            WALLET_SEND_CALLS.to_string(),
            wallet_send_calls::decode(payload, chain_id, envelope.from.as_ref(), capabilities.as_ref()),
        ),
        ShortcutPayload::WalletSign(payload) => (
            WALLET_SIGN.to_string(),
            wallet_sign::decode(payload, chain_id, envelope.from.as_ref(), capabilities.as_ref())?,
        ),
    };

    Ok(Request {
        method,
        params,
        chain_id: Some(chain_id),
        capabilities,
    })
}
