use prolink_types::{
    Call, CapabilityBytes, Envelope, GenericRpcPayload, ReceiveWithAuthorization,
    ShortcutPayload, ShortcutTag, SignatureData, SignatureKind, SpendPermission,
    TransactionData, TransactionKind, WalletSendCallsPayload, WalletSignPayload,
    PROTOCOL_VERSION,
};

use crate::{
    errors::DecodeError,
    limits::CodecLimits,
    primitives::encode_amount,
    utils::bytes::{
        expect_end, read_address, read_amount, read_b32, read_blob, read_option, read_string,
        read_u16_be, read_u8,
    },
};

/// Decode a binary record into an envelope with default limits.
pub fn decode_record(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    decode_record_with_limits(bytes, &CodecLimits::default())
}

pub fn decode_record_with_limits(bytes: &[u8], limits: &CodecLimits) -> Result<Envelope, DecodeError> {
    let mut i = 0usize;

    let protocol_version = read_u8(bytes, &mut i)?;
    if protocol_version != PROTOCOL_VERSION {
        return Err(DecodeError::UnsupportedProtocolVersion(protocol_version));
    }
    let chain_id = read_chain_id(bytes, &mut i)?;
    let from = read_option(bytes, &mut i, read_address)?;

    let tag = read_u8(bytes, &mut i)?;
    let tag = ShortcutTag::try_from(tag).map_err(|_| DecodeError::UnknownVariant {
        union: "shortcut",
        tag,
    })?;
    let payload = read_blob(bytes, &mut i)?;
    let shortcut = decode_shortcut(tag, &payload, limits)?;

    let capabilities = read_option(bytes, &mut i, |bytes, i| {
        read_capabilities(bytes, i, limits.max_capabilities)
    })?;
    expect_end(bytes, i)?;

    Ok(Envelope {
        protocol_version,
        chain_id,
        from,
        shortcut,
        capabilities,
    })
}

/// Decode a shortcut payload body for the given tag. The body must be consumed exactly.
pub fn decode_shortcut(
    tag: ShortcutTag,
    bytes: &[u8],
    limits: &CodecLimits,
) -> Result<ShortcutPayload, DecodeError> {
    let mut i = 0usize;
    let shortcut = match tag {
        ShortcutTag::GenericRpc => ShortcutPayload::GenericRpc(decode_generic_rpc(bytes, &mut i)?),
        ShortcutTag::WalletSendCalls => {
            ShortcutPayload::WalletSendCalls(decode_send_calls(bytes, &mut i, limits)?)
        }
        ShortcutTag::WalletSign => ShortcutPayload::WalletSign(decode_sign(bytes, &mut i)?),
    };
    expect_end(bytes, i)?;
    Ok(shortcut)
}

fn read_chain_id(bytes: &[u8], i: &mut usize) -> Result<u64, DecodeError> {
    let value = read_amount(bytes, i)?;
    u64::try_from(value).map_err(|_| DecodeError::FieldTooLarge {
        len: encode_amount(&value).len(),
        max: 8,
    })
}

fn read_capabilities(
    bytes: &[u8],
    i: &mut usize,
    max_entries: usize,
) -> Result<CapabilityBytes, DecodeError> {
    let count = read_u16_be(bytes, i)? as usize;
    if count > max_entries {
        return Err(DecodeError::TooManyEntries {
            what: "capabilities",
            count,
            max: max_entries,
        });
    }
    let mut capabilities = CapabilityBytes::new();
    let mut previous: Option<String> = None;
    for _ in 0..count {
        let key = read_string(bytes, i, "capability key")?;
        if previous.as_deref().is_some_and(|prev| key.as_str() <= prev) {
            return Err(DecodeError::NonCanonical("capability keys must be strictly ascending"));
        }
        let value = read_blob(bytes, i)?;
        previous = Some(key.clone());
        capabilities.insert(key, value);
    }
    Ok(capabilities)
}

fn decode_generic_rpc(bytes: &[u8], i: &mut usize) -> Result<GenericRpcPayload, DecodeError> {
    let method = read_string(bytes, i, "method")?;
    let params_json = read_blob(bytes, i)?;
    let rpc_version = read_string(bytes, i, "rpc version")?;
    Ok(GenericRpcPayload {
        method,
        params_json,
        rpc_version,
    })
}

fn decode_send_calls(
    bytes: &[u8],
    i: &mut usize,
    limits: &CodecLimits,
) -> Result<WalletSendCallsPayload, DecodeError> {
    let version = read_string(bytes, i, "version")?;
    let from = read_option(bytes, i, read_address)?;

    let kind = read_u8(bytes, i)?;
    let kind = TransactionKind::try_from(kind).map_err(|_| DecodeError::UnknownVariant {
        union: "transaction data",
        tag: kind,
    })?;
    let transaction_data = match kind {
        TransactionKind::Erc20Transfer => {
            let token = read_address(bytes, i)?;
            let recipient = read_address(bytes, i)?;
            let amount = read_amount(bytes, i)?;
            TransactionData::Erc20Transfer {
                token,
                recipient,
                amount,
            }
        }
        TransactionKind::NativeTransfer => {
            let recipient = read_address(bytes, i)?;
            let amount = read_amount(bytes, i)?;
            TransactionData::NativeTransfer { recipient, amount }
        }
        TransactionKind::GenericCalls => {
            let count = read_u16_be(bytes, i)? as usize;
            if count > limits.max_calls {
                return Err(DecodeError::TooManyEntries {
                    what: "calls",
                    count,
                    max: limits.max_calls,
                });
            }
            let mut calls = Vec::with_capacity(count);
            for _ in 0..count {
                let to = read_address(bytes, i)?;
                let data = read_blob(bytes, i)?;
                let value = read_amount(bytes, i)?;
                calls.push(Call { to, data, value });
            }
            TransactionData::GenericCalls { calls }
        }
    };

    Ok(WalletSendCallsPayload {
        version,
        from,
        transaction_data,
    })
}

fn decode_sign(bytes: &[u8], i: &mut usize) -> Result<WalletSignPayload, DecodeError> {
    let version = read_string(bytes, i, "version")?;

    let kind = read_u8(bytes, i)?;
    let kind = SignatureKind::try_from(kind).map_err(|_| DecodeError::UnknownVariant {
        union: "signature data",
        tag: kind,
    })?;
    let signature_data = match kind {
        SignatureKind::SpendPermission => {
            let account = read_address(bytes, i)?;
            let spender = read_address(bytes, i)?;
            let token = read_address(bytes, i)?;
            let allowance = read_amount(bytes, i)?;
            let period = read_amount(bytes, i)?;
            let start = read_amount(bytes, i)?;
            let end = read_amount(bytes, i)?;
            let salt = read_b32(bytes, i)?;
            let extra_data = read_blob(bytes, i)?;
            let domain_name = read_string(bytes, i, "domain name")?;
            let domain_version = read_string(bytes, i, "domain version")?;
            SignatureData::SpendPermission(SpendPermission {
                account,
                spender,
                token,
                allowance,
                period,
                start,
                end,
                salt,
                extra_data,
                domain_name,
                domain_version,
            })
        }
        SignatureKind::ReceiveWithAuthorization => {
            let from = read_address(bytes, i)?;
            let to = read_address(bytes, i)?;
            let value = read_amount(bytes, i)?;
            let valid_after = read_amount(bytes, i)?;
            let valid_before = read_amount(bytes, i)?;
            let nonce = read_b32(bytes, i)?;
            let domain_name = read_string(bytes, i, "domain name")?;
            let domain_version = read_string(bytes, i, "domain version")?;
            SignatureData::ReceiveWithAuthorization(ReceiveWithAuthorization {
                from,
                to,
                value,
                valid_after,
                valid_before,
                nonce,
                domain_name,
                domain_version,
            })
        }
        SignatureKind::GenericTypedData => SignatureData::GenericTypedData {
            typed_data_json: read_blob(bytes, i)?,
        },
    };

    Ok(WalletSignPayload {
        version,
        signature_data,
    })
}
