//! EIP-7871 `wallet_sign` shortcut over EIP-712 typed data.
//!
//! SpendPermission and ERC-3009 ReceiveWithAuthorization messages are stored as bare fields;
//! the domain, chain id and type table are rebuilt on decode. A message is only specialized
//! when that rebuild reproduces it exactly, otherwise the whole typed-data object is carried
//! as JSON.

use alloy_primitives::{Address, B256, U256};
use log::trace;
use prolink_types::{ReceiveWithAuthorization, SignatureData, SpendPermission, WalletSignPayload};
use serde_json::{json, Map, Value};

use crate::{
    errors::{DecodeError, EncodeError},
    primitives::{
        address_to_hex, chain_id_to_hex, data_to_hex, encode_address, encode_amount, hex_to_bytes,
        pad32, parse_chain_id, parse_uint,
    },
    request::{has_exact_keys, keys_within, optional_string},
    shortcuts::eip712::{
        domain_json, field_names, matches_types_table, types_table, usdc_address,
        RECEIVE_WITH_AUTHORIZATION, RECEIVE_WITH_AUTHORIZATION_FIELDS, SPEND_PERMISSION,
        SPEND_PERMISSION_FIELDS, SPEND_PERMISSION_MANAGER,
    },
};

pub const DEFAULT_VERSION: &str = "1";
/// EIP-7871 signature type for EIP-712 typed data.
pub const EIP712_SIGN_TYPE: &str = "0x01";

const PARAMS_KEYS: &[&str] = &["version", "chainId", "type", "data", "from", "capabilities"];
const TYPED_DATA_KEYS: &[&str] = &["types", "domain", "primaryType", "message"];
const DOMAIN_KEYS: &[&str] = &["name", "version", "chainId", "verifyingContract"];

/// Whether the params object only uses fields this shortcut carries.
pub fn is_representable(params: &Map<String, Value>) -> bool {
    keys_within(params, PARAMS_KEYS) && params.get("data").is_some_and(|data| !data.is_null())
}

/// Accept only the EIP-712 signature type, in any of its common spellings.
pub fn normalize_sign_type(value: Option<&Value>) -> Result<&'static str, EncodeError> {
    let supported = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("0x01") || s.eq_ignore_ascii_case("0x1"),
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(_) => false,
    };
    if !supported {
        let shown = value.map(Value::to_string).unwrap_or_default();
        return Err(EncodeError::UnsupportedSignType(shown));
    }
    Ok(EIP712_SIGN_TYPE)
}

/// The typed-data domain must sign for the chain the request targets.
pub fn check_domain_chain_id(data: &Value, chain_id: u64) -> Result<(), EncodeError> {
    let domain_chain_id = match data.get("domain").and_then(|domain| domain.get("chainId")) {
        None | Some(Value::Null) => return Ok(()),
        Some(value) => parse_chain_id(value)?,
    };
    if domain_chain_id != chain_id {
        return Err(EncodeError::ChainIdMismatch {
            request: chain_id,
            domain: domain_chain_id,
        });
    }
    Ok(())
}

pub fn encode(params: &Map<String, Value>, chain_id: u64) -> Result<WalletSignPayload, EncodeError> {
    normalize_sign_type(params.get("type"))?;
    let version = optional_string(params.get("version"), "version", DEFAULT_VERSION)?;
    let data = params
        .get("data")
        .filter(|data| !data.is_null())
        .ok_or_else(|| EncodeError::InvalidParams("wallet_sign requires typed data".to_string()))?;
    check_domain_chain_id(data, chain_id)?;

    let signature_data = match detect_signature(data, chain_id) {
        Some(specialized) => specialized,
        None => {
            trace!("wallet_sign: typed data carried as generic JSON");
            let typed_data_json =
                serde_json::to_vec(data).map_err(|err| EncodeError::InvalidParams(err.to_string()))?;
            SignatureData::GenericTypedData { typed_data_json }
        }
    };
    Ok(WalletSignPayload {
        version,
        signature_data,
    })
}

fn detect_signature(data: &Value, chain_id: u64) -> Option<SignatureData> {
    let typed = data.as_object()?;
    if !has_exact_keys(typed, TYPED_DATA_KEYS) {
        return None;
    }
    let domain = typed.get("domain")?.as_object()?;
    let verifying_contract = encode_address(domain.get("verifyingContract")?.as_str()?).ok()?;
    if !has_exact_keys(domain, DOMAIN_KEYS) {
        return None;
    }
    let domain_name = domain.get("name")?.as_str()?.to_string();
    let domain_version = domain.get("version")?.as_str()?.to_string();
    let message = typed.get("message")?.as_object()?;
    let types = typed.get("types")?;

    match typed.get("primaryType")?.as_str()? {
        SPEND_PERMISSION => {
            if verifying_contract != SPEND_PERMISSION_MANAGER
                || !matches_types_table(types, SPEND_PERMISSION, SPEND_PERMISSION_FIELDS)
                || !has_exact_keys(message, &field_names(SPEND_PERMISSION_FIELDS))
            {
                return None;
            }
            Some(SignatureData::SpendPermission(SpendPermission {
                account: address_field(message, "account")?,
                spender: address_field(message, "spender")?,
                token: address_field(message, "token")?,
                allowance: uint_field(message, "allowance")?,
                period: uint_field(message, "period")?,
                start: uint_field(message, "start")?,
                end: uint_field(message, "end")?,
                salt: pad32(&encode_amount(&uint_field(message, "salt")?)).ok()?,
                extra_data: hex_to_bytes(message.get("extraData")?.as_str()?).ok()?,
                domain_name,
                domain_version,
            }))
        }
        RECEIVE_WITH_AUTHORIZATION => {
            if Some(verifying_contract) != usdc_address(chain_id)
                || !matches_types_table(types, RECEIVE_WITH_AUTHORIZATION, RECEIVE_WITH_AUTHORIZATION_FIELDS)
                || !has_exact_keys(message, &field_names(RECEIVE_WITH_AUTHORIZATION_FIELDS))
            {
                return None;
            }
            Some(SignatureData::ReceiveWithAuthorization(ReceiveWithAuthorization {
                from: address_field(message, "from")?,
                to: address_field(message, "to")?,
                value: uint_field(message, "value")?,
                valid_after: uint_field(message, "validAfter")?,
                valid_before: uint_field(message, "validBefore")?,
                nonce: pad32(&hex_to_bytes(message.get("nonce")?.as_str()?).ok()?).ok()?,
                domain_name,
                domain_version,
            }))
        }
        _ => None,
    }
}

fn address_field(message: &Map<String, Value>, field: &str) -> Option<Address> {
    encode_address(message.get(field)?.as_str()?).ok()
}

fn uint_field(message: &Map<String, Value>, field: &str) -> Option<U256> {
    parse_uint(message.get(field)?).ok()
}

fn word_hex(word: &B256) -> String {
    data_to_hex(word.as_slice())
}

fn typed_data(primary_type: &str, fields: &[(&str, &str)], domain: Value, message: Value) -> Value {
    json!({
        "types": types_table(primary_type, fields),
        "domain": domain,
        "primaryType": primary_type,
        "message": message,
    })
}

fn spend_permission_json(permission: &SpendPermission, chain_id: u64) -> Value {
    let domain = domain_json(
        &permission.domain_name,
        &permission.domain_version,
        chain_id,
        &SPEND_PERMISSION_MANAGER,
    );
    let message = json!({
        "account": address_to_hex(&permission.account),
        "spender": address_to_hex(&permission.spender),
        "token": address_to_hex(&permission.token),
        "allowance": permission.allowance.to_string(),
        "period": permission.period.to_string(),
        "start": permission.start.to_string(),
        "end": permission.end.to_string(),
        "salt": U256::from_be_bytes(permission.salt.0).to_string(),
        "extraData": data_to_hex(&permission.extra_data),
    });
    typed_data(SPEND_PERMISSION, SPEND_PERMISSION_FIELDS, domain, message)
}

fn receive_with_authorization_json(
    authorization: &ReceiveWithAuthorization,
    chain_id: u64,
) -> Result<Value, DecodeError> {
    let token = usdc_address(chain_id).ok_or_else(|| {
        DecodeError::TypedDataParse(format!("no USDC contract known for chain {chain_id}"))
    })?;
    let domain = domain_json(
        &authorization.domain_name,
        &authorization.domain_version,
        chain_id,
        &token,
    );
    let message = json!({
        "from": address_to_hex(&authorization.from),
        "to": address_to_hex(&authorization.to),
        "value": authorization.value.to_string(),
        "validAfter": authorization.valid_after.to_string(),
        "validBefore": authorization.valid_before.to_string(),
        "nonce": word_hex(&authorization.nonce),
    });
    Ok(typed_data(
        RECEIVE_WITH_AUTHORIZATION,
        RECEIVE_WITH_AUTHORIZATION_FIELDS,
        domain,
        message,
    ))
}

/// Rebuild the `wallet_sign` params array.
pub fn decode(
    payload: &WalletSignPayload,
    chain_id: u64,
    from: Option<&Address>,
    capabilities: Option<&Map<String, Value>>,
) -> Result<Value, DecodeError> {
    let data = match &payload.signature_data {
        SignatureData::SpendPermission(permission) => spend_permission_json(permission, chain_id),
        SignatureData::ReceiveWithAuthorization(authorization) => {
            receive_with_authorization_json(authorization, chain_id)?
        }
        SignatureData::GenericTypedData { typed_data_json } => serde_json::from_slice(typed_data_json)
            .map_err(|err| DecodeError::TypedDataParse(err.to_string()))?,
    };

    let mut params = Map::new();
    params.insert("version".to_string(), Value::String(payload.version.clone()));
    params.insert("chainId".to_string(), Value::String(chain_id_to_hex(chain_id)));
    params.insert("type".to_string(), Value::String(EIP712_SIGN_TYPE.to_string()));
    params.insert("data".to_string(), data);
    if let Some(from) = from {
        params.insert("from".to_string(), Value::String(address_to_hex(from)));
    }
    if let Some(capabilities) = capabilities {
        params.insert("capabilities".to_string(), Value::Object(capabilities.clone()));
    }
    Ok(Value::Array(vec![Value::Object(params)]))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const BASE_SEPOLIA: u64 = 84532;

    fn spend_permission_data(domain_chain_id: Value) -> Value {
        json!({
            "types": {
                "SpendPermission": [
                    { "name": "account", "type": "address" },
                    { "name": "spender", "type": "address" },
                    { "name": "token", "type": "address" },
                    { "name": "allowance", "type": "uint160" },
                    { "name": "period", "type": "uint48" },
                    { "name": "start", "type": "uint48" },
                    { "name": "end", "type": "uint48" },
                    { "name": "salt", "type": "uint256" },
                    { "name": "extraData", "type": "bytes" }
                ]
            },
            "domain": {
                "name": "Spend Permission Manager",
                "version": "1",
                "chainId": domain_chain_id,
                "verifyingContract": "0xf85210B21cC50302F477BA56686d2019dC9b67Ad"
            },
            "primaryType": "SpendPermission",
            "message": {
                "account": "0xd8da6bf26964af9d7eed9e03e53415d37aa96045",
                "spender": "0x8d9f34934dc9619e5dc6f2e7a0cd0f4b5ad8da6c",
                "token": "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
                "allowance": "1000000",
                "period": 86400,
                "start": 0,
                "end": 281474976710655u64,
                "salt": "0x1",
                "extraData": "0x"
            }
        })
    }

    fn sign_params(chain_id: &str, data: Value) -> Map<String, Value> {
        json!({ "version": "1", "chainId": chain_id, "type": "0x01", "data": data })
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_spend_permission_is_specialized() {
        let params = sign_params("0x14a34", spend_permission_data(json!(BASE_SEPOLIA)));
        let payload = encode(&params, BASE_SEPOLIA).unwrap();
        let SignatureData::SpendPermission(permission) = &payload.signature_data else {
            panic!("expected spend permission, got {:?}", payload.signature_data);
        };
        assert_eq!(permission.allowance, U256::from(1_000_000u64));
        assert_eq!(permission.end, U256::from(281_474_976_710_655u64));
        assert_eq!(permission.salt, B256::with_last_byte(1));
        assert!(permission.extra_data.is_empty());
        assert_eq!(permission.domain_name, "Spend Permission Manager");
    }

    #[test]
    fn test_spend_permission_rebuilds_domain_and_types() {
        let params = sign_params("0x14a34", spend_permission_data(json!(BASE_SEPOLIA)));
        let payload = encode(&params, BASE_SEPOLIA).unwrap();
        let decoded = decode(&payload, BASE_SEPOLIA, None, None).unwrap();
        let data = &decoded[0]["data"];
        assert_eq!(data["domain"]["chainId"], json!(BASE_SEPOLIA));
        assert_eq!(
            data["domain"]["verifyingContract"],
            "0xf85210b21cc50302f477ba56686d2019dc9b67ad"
        );
        assert_eq!(data["types"]["EIP712Domain"].as_array().unwrap().len(), 4);
        assert_eq!(data["types"]["SpendPermission"], params["data"]["types"]["SpendPermission"]);
        assert_eq!(data["message"]["allowance"], "1000000");
        assert_eq!(decoded[0]["type"], "0x01");
    }

    #[test]
    fn test_chain_id_mismatch() {
        let params = sign_params("0x14a34", spend_permission_data(json!(1)));
        assert_eq!(
            encode(&params, BASE_SEPOLIA),
            Err(EncodeError::ChainIdMismatch {
                request: BASE_SEPOLIA,
                domain: 1
            })
        );
    }

    #[rstest]
    #[case::canonical(json!("0x01"))]
    #[case::short(json!("0x1"))]
    #[case::numeric(json!(1))]
    #[case::absent(Value::Null)]
    fn test_accepted_sign_types(#[case] sign_type: Value) {
        let mut params = sign_params("0x14a34", spend_permission_data(json!(BASE_SEPOLIA)));
        params.insert("type".to_string(), sign_type);
        assert!(encode(&params, BASE_SEPOLIA).is_ok());
    }

    #[rstest]
    #[case::personal_sign(json!("0x45"))]
    #[case::numeric(json!(2))]
    #[case::word(json!("eip712"))]
    fn test_rejected_sign_types(#[case] sign_type: Value) {
        let mut params = sign_params("0x14a34", spend_permission_data(json!(BASE_SEPOLIA)));
        params.insert("type".to_string(), sign_type);
        assert!(matches!(
            encode(&params, BASE_SEPOLIA),
            Err(EncodeError::UnsupportedSignType(_))
        ));
    }

    #[test]
    fn test_unknown_manager_falls_back_to_generic() {
        let mut data = spend_permission_data(json!(BASE_SEPOLIA));
        data["domain"]["verifyingContract"] = json!("0x0000000000000000000000000000000000000001");
        let payload = encode(&sign_params("0x14a34", data.clone()), BASE_SEPOLIA).unwrap();
        assert!(matches!(payload.signature_data, SignatureData::GenericTypedData { .. }));
        let decoded = decode(&payload, BASE_SEPOLIA, None, None).unwrap();
        assert_eq!(decoded[0]["data"], data);
    }

    #[test]
    fn test_receive_with_authorization() {
        let data = json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" }
                ],
                "ReceiveWithAuthorization": [
                    { "name": "from", "type": "address" },
                    { "name": "to", "type": "address" },
                    { "name": "value", "type": "uint256" },
                    { "name": "validAfter", "type": "uint256" },
                    { "name": "validBefore", "type": "uint256" },
                    { "name": "nonce", "type": "bytes32" }
                ]
            },
            "domain": {
                "name": "USDC",
                "version": "2",
                "chainId": BASE_SEPOLIA,
                "verifyingContract": "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
            },
            "primaryType": "ReceiveWithAuthorization",
            "message": {
                "from": "0xd8da6bf26964af9d7eed9e03e53415d37aa96045",
                "to": "0x8d9f34934dc9619e5dc6f2e7a0cd0f4b5ad8da6c",
                "value": "5000000",
                "validAfter": "0",
                "validBefore": "1900000000",
                "nonce": format!("0x{}", "ab".repeat(32))
            }
        });
        let payload = encode(&sign_params("0x14a34", data.clone()), BASE_SEPOLIA).unwrap();
        let SignatureData::ReceiveWithAuthorization(authorization) = &payload.signature_data else {
            panic!("expected receive with authorization, got {:?}", payload.signature_data);
        };
        assert_eq!(authorization.value, U256::from(5_000_000u64));
        assert_eq!(authorization.nonce, B256::repeat_byte(0xab));

        let decoded = decode(&payload, BASE_SEPOLIA, None, None).unwrap();
        assert_eq!(decoded[0]["data"]["types"], data["types"]);
        assert_eq!(decoded[0]["data"]["message"], data["message"]);
        assert_eq!(
            decoded[0]["data"]["domain"]["verifyingContract"],
            "0x036cbd53842c5426634e7929541ec2318f3dcf7e"
        );
    }

    #[test]
    fn test_receive_on_unknown_chain_is_generic() {
        let data = json!({
            "types": { "ReceiveWithAuthorization": [] },
            "domain": { "name": "USDC", "version": "2", "chainId": 10, "verifyingContract": "0x036CbD53842c5426634e7929541eC2318f3dCF7e" },
            "primaryType": "ReceiveWithAuthorization",
            "message": {}
        });
        let payload = encode(&sign_params("0xa", data), 10).unwrap();
        assert!(matches!(payload.signature_data, SignatureData::GenericTypedData { .. }));
    }

    #[test]
    fn test_missing_verifying_contract_is_generic() {
        let mut data = spend_permission_data(json!(BASE_SEPOLIA));
        data["domain"].as_object_mut().unwrap().remove("verifyingContract");
        let payload = encode(&sign_params("0x14a34", data), BASE_SEPOLIA).unwrap();
        assert!(matches!(payload.signature_data, SignatureData::GenericTypedData { .. }));
    }

    #[test]
    fn test_malformed_generic_typed_data() {
        let payload = WalletSignPayload {
            version: DEFAULT_VERSION.to_string(),
            signature_data: SignatureData::GenericTypedData {
                typed_data_json: b"{\"types\":".to_vec(),
            },
        };
        assert!(matches!(
            decode(&payload, 1, None, None),
            Err(DecodeError::TypedDataParse(_))
        ));
    }
}
