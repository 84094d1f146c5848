//! EIP-5792 `wallet_sendCalls` shortcut.
//!
//! Detection order is fixed: ERC20 transfer, then native transfer, then the generic call list.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use log::trace;
use prolink_types::{Call, TransactionData, WalletSendCallsPayload};
use serde_json::{json, Map, Value};

use crate::{
    errors::EncodeError,
    limits::CodecLimits,
    primitives::{address_to_hex, amount_to_hex, chain_id_to_hex, data_to_hex, encode_address, hex_to_bytes, parse_amount},
    request::{keys_within, optional_address, optional_string},
};

sol! {
    function transfer(address to, uint256 amount) external returns (bool);
}

pub const DEFAULT_VERSION: &str = "1.0";

/// selector || address word || amount word
const ERC20_TRANSFER_CALLDATA_LEN: usize = 4 + 32 + 32;

const PARAMS_KEYS: &[&str] = &["version", "chainId", "from", "calls", "capabilities"];
const CALL_KEYS: &[&str] = &["to", "data", "value"];

/// Whether the params object only uses fields this shortcut carries.
///
/// Anything else (extra EIP-5792 fields, contract-creation calls) goes through the generic
/// JSON-RPC path instead so nothing is dropped.
pub fn is_representable(params: &Map<String, Value>) -> bool {
    if !keys_within(params, PARAMS_KEYS) {
        return false;
    }
    let Some(calls) = params.get("calls").and_then(Value::as_array) else {
        return false;
    };
    calls.iter().all(|call| {
        call.as_object()
            .is_some_and(|call| keys_within(call, CALL_KEYS) && call.get("to").is_some_and(Value::is_string))
    })
}

pub fn encode(
    params: &Map<String, Value>,
    limits: &CodecLimits,
) -> Result<WalletSendCallsPayload, EncodeError> {
    let version = optional_string(params.get("version"), "version", DEFAULT_VERSION)?;
    let from = optional_address(params.get("from"))?;
    let calls = params
        .get("calls")
        .and_then(Value::as_array)
        .ok_or_else(|| EncodeError::InvalidParams("wallet_sendCalls requires a calls array".to_string()))?;
    if calls.len() > limits.max_calls {
        return Err(EncodeError::TooManyEntries {
            what: "calls",
            count: calls.len(),
            max: limits.max_calls,
        });
    }
    let calls = calls.iter().map(parse_call).collect::<Result<Vec<_>, _>>()?;

    Ok(WalletSendCallsPayload {
        version,
        from,
        transaction_data: detect_transaction(calls),
    })
}

fn parse_call(value: &Value) -> Result<Call, EncodeError> {
    let call = value
        .as_object()
        .ok_or_else(|| EncodeError::InvalidParams(format!("call must be an object, got {value}")))?;
    let to = match call.get("to") {
        Some(Value::String(to)) => encode_address(to)?,
        _ => return Err(EncodeError::InvalidParams("call requires a `to` address".to_string())),
    };
    let data = match call.get("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(data)) => hex_to_bytes(data)?,
        Some(other) => {
            return Err(EncodeError::InvalidParams(format!("call data must be hex, got {other}")))
        }
    };
    let value = match call.get("value") {
        None | Some(Value::Null) => U256::ZERO,
        Some(value) => parse_amount(value)?,
    };
    Ok(Call { to, data, value })
}

fn detect_transaction(calls: Vec<Call>) -> TransactionData {
    if let [call] = calls.as_slice() {
        if let Some((recipient, amount)) = match_erc20_transfer(call) {
            return TransactionData::Erc20Transfer {
                token: call.to,
                recipient,
                amount,
            };
        }
        // A single 0x00 byte is calldata, not an empty payload.
        if call.data.is_empty() && !call.value.is_zero() {
            return TransactionData::NativeTransfer {
                recipient: call.to,
                amount: call.value,
            };
        }
    }
    trace!("wallet_sendCalls: {} call(s) encoded as generic calls", calls.len());
    TransactionData::GenericCalls { calls }
}

fn match_erc20_transfer(call: &Call) -> Option<(Address, U256)> {
    if !call.value.is_zero()
        || call.data.len() != ERC20_TRANSFER_CALLDATA_LEN
        || call.data[..4] != transferCall::SELECTOR
    {
        return None;
    }
    let decoded = transferCall::abi_decode_raw(&call.data[4..], true).ok()?;
    // Only specialize when the rebuilt calldata is byte-identical.
    if erc20_transfer_calldata(decoded.to, decoded.amount) != call.data {
        return None;
    }
    Some((decoded.to, decoded.amount))
}

fn erc20_transfer_calldata(recipient: Address, amount: U256) -> Vec<u8> {
    transferCall {
        to: recipient,
        amount,
    }
    .abi_encode()
}

fn call_json(to: &Address, data: &[u8], value: &U256) -> Value {
    json!({
        "to": address_to_hex(to),
        "data": data_to_hex(data),
        "value": amount_to_hex(value),
    })
}

/// Rebuild the `wallet_sendCalls` params array.
pub fn decode(
    payload: &WalletSendCallsPayload,
    chain_id: u64,
    from: Option<&Address>,
    capabilities: Option<&Map<String, Value>>,
) -> Value {
    let calls: Vec<Value> = match &payload.transaction_data {
        TransactionData::Erc20Transfer {
            token,
            recipient,
            amount,
        } => vec![call_json(
            token,
            &erc20_transfer_calldata(*recipient, *amount),
            &U256::ZERO,
        )],
        TransactionData::NativeTransfer { recipient, amount } => {
            vec![call_json(recipient, &[], amount)]
        }
        TransactionData::GenericCalls { calls } => calls
            .iter()
            .map(|call| call_json(&call.to, &call.data, &call.value))
            .collect(),
    };

    let mut params = Map::new();
    params.insert("version".to_string(), Value::String(payload.version.clone()));
    params.insert("chainId".to_string(), Value::String(chain_id_to_hex(chain_id)));
    if let Some(from) = payload.from.as_ref().or(from) {
        params.insert("from".to_string(), Value::String(address_to_hex(from)));
    }
    params.insert("calls".to_string(), Value::Array(calls));
    if let Some(capabilities) = capabilities {
        params.insert("capabilities".to_string(), Value::Object(capabilities.clone()));
    }
    Value::Array(vec![Value::Object(params)])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const USDC: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";
    const RECIPIENT: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    fn transfer_data(selector: &str, recipient: &str, amount_word: &str) -> String {
        format!("0x{selector}000000000000000000000000{}{amount_word}", &recipient[2..])
    }

    fn five_usdc_word() -> String {
        format!("{:0>64}", "4c4b40")
    }

    fn encode_calls(calls: Value) -> WalletSendCallsPayload {
        let params = json!({ "version": "1.0", "chainId": "0x2105", "calls": calls });
        encode(params.as_object().unwrap(), &CodecLimits::default()).unwrap()
    }

    #[rstest]
    #[case::lowercase_selector("a9059cbb")]
    #[case::uppercase_selector("A9059CBB")]
    fn test_detects_erc20_transfer(#[case] selector: &str) {
        let payload = encode_calls(json!([{
            "to": USDC,
            "data": transfer_data(selector, RECIPIENT, &five_usdc_word()),
            "value": "0x0"
        }]));
        assert_eq!(
            payload.transaction_data,
            TransactionData::Erc20Transfer {
                token: encode_address(USDC).unwrap(),
                recipient: encode_address(RECIPIENT).unwrap(),
                amount: U256::from(5_000_000u64),
            }
        );
    }

    #[test]
    fn test_erc20_decode_rebuilds_calldata() {
        let data = transfer_data("a9059cbb", RECIPIENT, &five_usdc_word());
        let payload = encode_calls(json!([{ "to": USDC, "data": data }]));
        let params = decode(&payload, 8453, None, None);
        assert_eq!(params[0]["calls"][0]["data"], Value::String(data));
        assert_eq!(params[0]["calls"][0]["value"], "0x0");
        assert_eq!(params[0]["chainId"], "0x2105");
    }

    #[rstest]
    #[case::nonzero_value(json!([{ "to": USDC, "data": transfer_data("a9059cbb", RECIPIENT, &five_usdc_word()), "value": "0x1" }]))]
    #[case::wrong_selector(json!([{ "to": USDC, "data": transfer_data("095ea7b3", RECIPIENT, &five_usdc_word()) }]))]
    #[case::extra_byte(json!([{ "to": USDC, "data": format!("{}00", transfer_data("a9059cbb", RECIPIENT, &five_usdc_word())) }]))]
    #[case::dirty_address_word(json!([{ "to": USDC, "data": format!("0xa9059cbb{}{}{}", "ff".repeat(12), &RECIPIENT[2..], five_usdc_word()) }]))]
    #[case::two_calls(json!([
        { "to": USDC, "data": transfer_data("a9059cbb", RECIPIENT, &five_usdc_word()) },
        { "to": USDC, "data": transfer_data("a9059cbb", RECIPIENT, &five_usdc_word()) }
    ]))]
    fn test_erc20_deviations_fall_through(#[case] calls: Value) {
        let payload = encode_calls(calls);
        assert!(matches!(payload.transaction_data, TransactionData::GenericCalls { .. }));
    }

    #[rstest]
    #[case::hex_prefix_only(json!("0x"))]
    #[case::empty_string(json!(""))]
    #[case::absent(Value::Null)]
    fn test_detects_native_transfer(#[case] data: Value) {
        let mut call = json!({ "to": RECIPIENT, "value": "0xde0b6b3a7640000" });
        if !data.is_null() {
            call["data"] = data;
        }
        let payload = encode_calls(json!([call]));
        assert_eq!(
            payload.transaction_data,
            TransactionData::NativeTransfer {
                recipient: encode_address(RECIPIENT).unwrap(),
                amount: U256::from(1_000_000_000_000_000_000u64),
            }
        );
    }

    #[test]
    fn test_zero_byte_data_is_not_native_transfer() {
        let payload = encode_calls(json!([{ "to": RECIPIENT, "data": "0x00", "value": "0x1" }]));
        match payload.transaction_data {
            TransactionData::GenericCalls { calls } => assert_eq!(calls[0].data, vec![0x00]),
            other => panic!("expected generic calls, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_value_empty_call_is_generic() {
        let payload = encode_calls(json!([{ "to": RECIPIENT, "data": "0x", "value": "0x0" }]));
        assert!(matches!(payload.transaction_data, TransactionData::GenericCalls { .. }));
    }

    #[test]
    fn test_defaults_and_sender() {
        let params = json!({
            "chainId": "0x1",
            "from": "0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045",
            "calls": []
        });
        let payload = encode(params.as_object().unwrap(), &CodecLimits::default()).unwrap();
        assert_eq!(payload.version, DEFAULT_VERSION);
        assert_eq!(payload.from, Some(encode_address(RECIPIENT).unwrap()));
        let decoded = decode(&payload, 1, None, None);
        assert_eq!(decoded[0]["from"], RECIPIENT);
    }

    #[test]
    fn test_negative_value_rejected() {
        let params = json!({ "chainId": "0x1", "calls": [{ "to": RECIPIENT, "value": -5 }] });
        assert_eq!(
            encode(params.as_object().unwrap(), &CodecLimits::default()),
            Err(EncodeError::NegativeAmount)
        );
    }

    #[test]
    fn test_call_limit() {
        let calls: Vec<Value> = (0..3).map(|_| json!({ "to": RECIPIENT })).collect();
        let params = json!({ "chainId": "0x1", "calls": calls });
        assert_eq!(
            encode(params.as_object().unwrap(), &CodecLimits::new().with_max_calls(2)),
            Err(EncodeError::TooManyEntries { what: "calls", count: 3, max: 2 })
        );
    }

    #[test]
    fn test_representable_shapes() {
        let plain = json!({ "chainId": "0x1", "calls": [{ "to": RECIPIENT, "value": "0x1" }] });
        assert!(is_representable(plain.as_object().unwrap()));
        let extra_field = json!({ "chainId": "0x1", "atomicRequired": true, "calls": [] });
        assert!(!is_representable(extra_field.as_object().unwrap()));
        let deploy = json!({ "chainId": "0x1", "calls": [{ "data": "0x6080" }] });
        assert!(!is_representable(deploy.as_object().unwrap()));
    }
}
