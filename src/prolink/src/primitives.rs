//! Canonical encodings for addresses, amounts and 32-byte fields.
//!
//! Every other layer is built on these. The decode side enforces canonical form: an amount
//! with a leading zero byte or an address of the wrong width is rejected, never repaired.

use alloy_primitives::{Address, B256, U256};
use serde_json::Value;

use crate::errors::{DecodeError, EncodeError};

pub const ADDRESS_LEN: usize = 20;
pub const WORD_LEN: usize = 32;

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a hex address (optional `0x`, any case) into its 20 bytes.
pub fn encode_address(s: &str) -> Result<Address, EncodeError> {
    let bytes = hex::decode(strip_0x(s)).map_err(|_| EncodeError::InvalidHex(s.to_string()))?;
    if bytes.len() != ADDRESS_LEN {
        return Err(EncodeError::InvalidAddressLength(bytes.len()));
    }
    Ok(Address::from_slice(&bytes))
}

pub fn decode_address(bytes: &[u8]) -> Result<Address, DecodeError> {
    if bytes.len() != ADDRESS_LEN {
        return Err(DecodeError::InvalidAddressLength(bytes.len()));
    }
    Ok(Address::from_slice(bytes))
}

/// Lowercase `0x`-prefixed rendering (no EIP-55 checksum).
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Minimal big-endian bytes. Zero is the single byte `0x00`.
pub fn encode_amount(value: &U256) -> Vec<u8> {
    let word = value.to_be_bytes::<32>();
    match word.iter().position(|b| *b != 0) {
        Some(first) => word[first..].to_vec(),
        None => vec![0],
    }
}

/// Inverse of [`encode_amount`]. The empty slice is also accepted as zero.
pub fn decode_amount(bytes: &[u8]) -> Result<U256, DecodeError> {
    match bytes {
        [] | [0] => Ok(U256::ZERO),
        [0, ..] => Err(DecodeError::LeadingZeroBytes),
        _ if bytes.len() > WORD_LEN => Err(DecodeError::FieldTooLarge {
            len: bytes.len(),
            max: WORD_LEN,
        }),
        _ => Ok(U256::from_be_slice(bytes)),
    }
}

/// Left-pad to a full 32-byte word.
pub fn pad32(bytes: &[u8]) -> Result<B256, EncodeError> {
    if bytes.len() > WORD_LEN {
        return Err(EncodeError::FieldTooLarge {
            len: bytes.len(),
            max: WORD_LEN,
        });
    }
    let mut word = [0u8; 32];
    word[WORD_LEN - bytes.len()..].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Minimal hex: leading zero bytes stripped, `0x0` for zero.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    match bytes.iter().position(|b| *b != 0) {
        Some(first) => format!("0x{}", hex::encode(&bytes[first..])),
        None => "0x0".to_string(),
    }
}

/// Full-width hex, used for calldata and other opaque byte strings.
pub fn data_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with an optional `0x`; an odd digit count is left-padded with a zero nibble.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, EncodeError> {
    let digits = strip_0x(s);
    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.map_err(|_| EncodeError::InvalidHex(s.to_string()))
}

fn u256_from_be(bytes: &[u8]) -> Result<U256, EncodeError> {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first..];
    if significant.len() > WORD_LEN {
        return Err(EncodeError::FieldTooLarge {
            len: significant.len(),
            max: WORD_LEN,
        });
    }
    Ok(U256::from_be_slice(significant))
}

fn u256_from_number(n: &serde_json::Number) -> Result<U256, EncodeError> {
    if let Some(v) = n.as_u64() {
        return Ok(U256::from(v));
    }
    if n.as_i64().is_some_and(|v| v < 0) || n.as_f64().is_some_and(|v| v < 0.0) {
        return Err(EncodeError::NegativeAmount);
    }
    Err(EncodeError::InvalidParams(format!("{n} is not an unsigned integer")))
}

/// Amount from a JSON integer or a hex string (optional `0x`).
pub fn parse_amount(value: &Value) -> Result<U256, EncodeError> {
    match value {
        Value::Number(n) => u256_from_number(n),
        Value::String(s) if s.starts_with('-') => Err(EncodeError::NegativeAmount),
        Value::String(s) => u256_from_be(&hex_to_bytes(s)?),
        other => Err(EncodeError::InvalidParams(format!("expected amount, got {other}"))),
    }
}

/// Unsigned integer in EIP-712 message conventions: JSON integer, decimal string, or `0x` hex.
pub fn parse_uint(value: &Value) -> Result<U256, EncodeError> {
    match value {
        Value::Number(n) => u256_from_number(n),
        Value::String(s) if s.starts_with('-') => Err(EncodeError::NegativeAmount),
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            u256_from_be(&hex_to_bytes(s)?)
        }
        Value::String(s) => U256::from_str_radix(s, 10)
            .map_err(|_| EncodeError::InvalidParams(format!("`{s}` is not an unsigned integer"))),
        other => Err(EncodeError::InvalidParams(format!("expected integer, got {other}"))),
    }
}

/// Chain id from a hex string, decimal string or JSON integer.
pub fn parse_chain_id(value: &Value) -> Result<u64, EncodeError> {
    let id = parse_uint(value)?;
    u64::try_from(id).map_err(|_| EncodeError::InvalidParams(format!("chain id {id} exceeds 64 bits")))
}

pub fn chain_id_to_hex(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// JSON-RPC quantity: `0x` followed by hex digits without leading zeros, `0x0` for zero.
pub fn amount_to_hex(value: &U256) -> String {
    let digits = hex::encode(encode_amount(value));
    match digits.trim_start_matches('0') {
        "" => "0x0".to_string(),
        significant => format!("0x{significant}"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::zero(0, &[0x00])]
    #[case::one_byte(255, &[0xFF])]
    #[case::two_bytes(256, &[0x01, 0x00])]
    #[case::five_million(5_000_000, &[0x4C, 0x4B, 0x40])]
    #[case::one_ether(1_000_000_000_000_000_000, &[0x0D, 0xE0, 0xB6, 0xB3, 0xA7, 0x64, 0x00, 0x00])]
    fn test_encode_amount_is_minimal(#[case] value: u128, #[case] expected: &[u8]) {
        let encoded = encode_amount(&U256::from(value));
        assert_eq!(encoded, expected);
        assert_eq!(decode_amount(&encoded).unwrap(), U256::from(value));
    }

    #[test]
    fn test_encode_amount_never_leads_with_zero() {
        for shift in 0..256usize {
            let value = U256::from(1u8) << shift;
            let encoded = encode_amount(&value);
            assert_ne!(encoded[0], 0, "leading zero for 2^{shift}");
        }
        assert_eq!(encode_amount(&U256::MAX).len(), 32);
    }

    #[test]
    fn test_decode_amount_rejects_leading_zero() {
        assert_eq!(decode_amount(&[0x00, 0x01]), Err(DecodeError::LeadingZeroBytes));
        assert_eq!(decode_amount(&[]).unwrap(), U256::ZERO);
        assert_eq!(decode_amount(&[0x00]).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_decode_amount_rejects_oversized() {
        let bytes = [0x01u8; 33];
        assert_eq!(
            decode_amount(&bytes),
            Err(DecodeError::FieldTooLarge { len: 33, max: 32 })
        );
    }

    #[rstest]
    #[case::short(19)]
    #[case::long(21)]
    #[case::empty(0)]
    fn test_decode_address_length(#[case] len: usize) {
        assert_eq!(
            decode_address(&vec![0xAB; len]),
            Err(DecodeError::InvalidAddressLength(len))
        );
    }

    #[test]
    fn test_address_is_case_insensitive_and_lowercased() {
        let upper = encode_address("0x833589FCD6EDB6E08F4C7C32D4F71B54BDA02913").unwrap();
        let lower = encode_address("833589fcd6edb6e08f4c7c32d4f71b54bda02913").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(
            address_to_hex(&upper),
            "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
        );
        assert_eq!(
            encode_address("0x1234"),
            Err(EncodeError::InvalidAddressLength(2))
        );
    }

    #[test]
    fn test_pad32() {
        let word = pad32(&[0x01, 0x02]).unwrap();
        assert_eq!(word[30..], [0x01, 0x02]);
        assert!(word[..30].iter().all(|b| *b == 0));
        assert_eq!(
            pad32(&[0u8; 33]),
            Err(EncodeError::FieldTooLarge { len: 33, max: 32 })
        );
    }

    #[test]
    fn test_hex_conversions() {
        assert_eq!(hex_to_bytes("0xabc").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(hex_to_bytes("ff").unwrap(), vec![0xff]);
        assert_eq!(hex_to_bytes("0x").unwrap(), Vec::<u8>::new());
        assert!(matches!(hex_to_bytes("0xzz"), Err(EncodeError::InvalidHex(_))));
        assert_eq!(bytes_to_hex(&[0x00, 0x00, 0x01, 0x00]), "0x0100");
        assert_eq!(bytes_to_hex(&[0x00]), "0x0");
        assert_eq!(bytes_to_hex(&[]), "0x0");
    }

    #[rstest]
    #[case::zero(U256::ZERO, "0x0")]
    #[case::one(U256::from(1u64), "0x1")]
    #[case::five(U256::from(5u64), "0x5")]
    #[case::byte(U256::from(255u64), "0xff")]
    #[case::odd_digits(U256::from(256u64), "0x100")]
    #[case::ether(U256::from(1_000_000_000_000_000_000u64), "0xde0b6b3a7640000")]
    fn test_amount_to_hex_is_quantity(#[case] value: U256, #[case] expected: &str) {
        assert_eq!(amount_to_hex(&value), expected);
        assert_eq!(parse_amount(&json!(expected)).unwrap(), value);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!("0x4c4b40")).unwrap(), U256::from(5_000_000u64));
        assert_eq!(parse_amount(&json!(5_000_000)).unwrap(), U256::from(5_000_000u64));
        assert_eq!(parse_amount(&json!(-1)), Err(EncodeError::NegativeAmount));
        assert_eq!(parse_amount(&json!("-0x1")), Err(EncodeError::NegativeAmount));
        assert!(matches!(parse_amount(&json!(true)), Err(EncodeError::InvalidParams(_))));
    }

    #[test]
    fn test_parse_uint_and_chain_id() {
        assert_eq!(parse_uint(&json!("1000000")).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_uint(&json!("0x0f4240")).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_chain_id(&json!("0x14a34")).unwrap(), 84532);
        assert_eq!(parse_chain_id(&json!(8453)).unwrap(), 8453);
        assert!(parse_chain_id(&json!("0x10000000000000000")).is_err());
        assert_eq!(chain_id_to_hex(84532), "0x14a34");
    }
}
