use alloy_primitives::U256;
use prolink_types::{
    Envelope, GenericRpcPayload, ShortcutPayload, SignatureData, TransactionData,
    WalletSendCallsPayload, WalletSignPayload,
};

use crate::{
    errors::EncodeError,
    utils::bytes::{write_amount, write_blob, write_option_address, write_option_flag, write_string},
};

/// Encode an envelope into its tagged binary record (before compression framing).
///
/// Layout (big-endian for integer fields):
/// - u8 protocol_version
/// - amount chain_id (u8 len + minimal bytes)
/// - option<address> from
/// - u8 shortcut_tag, u32 payload_len, payload
/// - option<capability map> (u16 count, then string key + blob value per entry, keys ascending)
pub fn encode_record(envelope: &Envelope) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();

    buf.push(envelope.protocol_version);
    write_amount(&mut buf, &U256::from(envelope.chain_id));
    write_option_address(&mut buf, envelope.from.as_ref());

    buf.push(envelope.shortcut.tag() as u8);
    let payload = encode_shortcut(&envelope.shortcut)?;
    write_blob(&mut buf, &payload)?;

    match &envelope.capabilities {
        Some(capabilities) => {
            write_option_flag(&mut buf, true);
            let count = u16::try_from(capabilities.len()).map_err(|_| EncodeError::TooManyEntries {
                what: "capabilities",
                count: capabilities.len(),
                max: u16::MAX as usize,
            })?;
            buf.extend_from_slice(&count.to_be_bytes());
            // BTreeMap iteration is already in ascending key order.
            for (key, value) in capabilities {
                write_string(&mut buf, key)?;
                write_blob(&mut buf, value)?;
            }
        }
        None => write_option_flag(&mut buf, false),
    }

    Ok(buf)
}

/// Encode just the shortcut payload body (without its tag or length prefix).
pub fn encode_shortcut(shortcut: &ShortcutPayload) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    match shortcut {
        ShortcutPayload::GenericRpc(payload) => encode_generic_rpc(payload, &mut buf)?,
        ShortcutPayload::WalletSendCalls(payload) => encode_send_calls(payload, &mut buf)?,
        ShortcutPayload::WalletSign(payload) => encode_sign(payload, &mut buf)?,
    }
    Ok(buf)
}

fn encode_generic_rpc(payload: &GenericRpcPayload, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    write_string(buf, &payload.method)?;
    write_blob(buf, &payload.params_json)?;
    write_string(buf, &payload.rpc_version)
}

fn encode_send_calls(payload: &WalletSendCallsPayload, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    write_string(buf, &payload.version)?;
    write_option_address(buf, payload.from.as_ref());
    buf.push(payload.transaction_data.kind() as u8);
    match &payload.transaction_data {
        TransactionData::Erc20Transfer {
            token,
            recipient,
            amount,
        } => {
            buf.extend_from_slice(token.as_slice());
            buf.extend_from_slice(recipient.as_slice());
            write_amount(buf, amount);
        }
        TransactionData::NativeTransfer { recipient, amount } => {
            buf.extend_from_slice(recipient.as_slice());
            write_amount(buf, amount);
        }
        TransactionData::GenericCalls { calls } => {
            let count = u16::try_from(calls.len()).map_err(|_| EncodeError::TooManyEntries {
                what: "calls",
                count: calls.len(),
                max: u16::MAX as usize,
            })?;
            buf.extend_from_slice(&count.to_be_bytes());
            for call in calls {
                buf.extend_from_slice(call.to.as_slice());
                write_blob(buf, &call.data)?;
                write_amount(buf, &call.value);
            }
        }
    }
    Ok(())
}

fn encode_sign(payload: &WalletSignPayload, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    write_string(buf, &payload.version)?;
    buf.push(payload.signature_data.kind() as u8);
    match &payload.signature_data {
        SignatureData::SpendPermission(permission) => {
            buf.extend_from_slice(permission.account.as_slice());
            buf.extend_from_slice(permission.spender.as_slice());
            buf.extend_from_slice(permission.token.as_slice());
            write_amount(buf, &permission.allowance);
            write_amount(buf, &permission.period);
            write_amount(buf, &permission.start);
            write_amount(buf, &permission.end);
            buf.extend_from_slice(permission.salt.as_slice());
            write_blob(buf, &permission.extra_data)?;
            write_string(buf, &permission.domain_name)?;
            write_string(buf, &permission.domain_version)?;
        }
        SignatureData::ReceiveWithAuthorization(authorization) => {
            buf.extend_from_slice(authorization.from.as_slice());
            buf.extend_from_slice(authorization.to.as_slice());
            write_amount(buf, &authorization.value);
            write_amount(buf, &authorization.valid_after);
            write_amount(buf, &authorization.valid_before);
            buf.extend_from_slice(authorization.nonce.as_slice());
            write_string(buf, &authorization.domain_name)?;
            write_string(buf, &authorization.domain_version)?;
        }
        SignatureData::GenericTypedData { typed_data_json } => {
            write_blob(buf, typed_data_json)?;
        }
    }
    Ok(())
}
