//! EIP-712 type tables and verifying contracts implied by the specialized signature variants.
//!
//! None of this is carried on the wire; decode rebuilds it from the variant and the
//! envelope chain id.

use alloy_primitives::{address, Address};
use serde_json::{json, Map, Value};

use crate::primitives::address_to_hex;

pub const EIP712_DOMAIN: &str = "EIP712Domain";
pub const SPEND_PERMISSION: &str = "SpendPermission";
pub const RECEIVE_WITH_AUTHORIZATION: &str = "ReceiveWithAuthorization";

/// Coinbase SpendPermissionManager, deployed at the same address on every supported chain.
pub const SPEND_PERMISSION_MANAGER: Address = address!("f85210b21cc50302f477ba56686d2019dc9b67ad");

pub const DOMAIN_FIELDS: &[(&str, &str)] = &[
    ("name", "string"),
    ("version", "string"),
    ("chainId", "uint256"),
    ("verifyingContract", "address"),
];

pub const SPEND_PERMISSION_FIELDS: &[(&str, &str)] = &[
    ("account", "address"),
    ("spender", "address"),
    ("token", "address"),
    ("allowance", "uint160"),
    ("period", "uint48"),
    ("start", "uint48"),
    ("end", "uint48"),
    ("salt", "uint256"),
    ("extraData", "bytes"),
];

pub const RECEIVE_WITH_AUTHORIZATION_FIELDS: &[(&str, &str)] = &[
    ("from", "address"),
    ("to", "address"),
    ("value", "uint256"),
    ("validAfter", "uint256"),
    ("validBefore", "uint256"),
    ("nonce", "bytes32"),
];

/// Native USDC (ERC-3009 capable) for the chains the receive shortcut supports.
pub fn usdc_address(chain_id: u64) -> Option<Address> {
    match chain_id {
        1 => Some(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")),
        8453 => Some(address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913")),
        84532 => Some(address!("036cbd53842c5426634e7929541ec2318f3dcf7e")),
        _ => None,
    }
}

pub fn field_names<'a>(fields: &[(&'a str, &'a str)]) -> Vec<&'a str> {
    fields.iter().map(|(name, _)| *name).collect()
}

pub fn fields_json(fields: &[(&str, &str)]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|(name, ty)| json!({ "name": name, "type": ty }))
            .collect(),
    )
}

/// Full `types` table: `EIP712Domain` plus the primary struct.
pub fn types_table(primary_type: &str, fields: &[(&str, &str)]) -> Value {
    let mut types = Map::new();
    types.insert(EIP712_DOMAIN.to_string(), fields_json(DOMAIN_FIELDS));
    types.insert(primary_type.to_string(), fields_json(fields));
    Value::Object(types)
}

/// Whether `types` is exactly what [`types_table`] rebuilds, optionally without
/// `EIP712Domain` (which is implied by the domain object).
pub fn matches_types_table(types: &Value, primary_type: &str, fields: &[(&str, &str)]) -> bool {
    let Some(types) = types.as_object() else {
        return false;
    };
    let domain_ok = match types.get(EIP712_DOMAIN) {
        Some(domain) => *domain == fields_json(DOMAIN_FIELDS),
        None => true,
    };
    let expected_len = if types.contains_key(EIP712_DOMAIN) { 2 } else { 1 };
    domain_ok
        && types.len() == expected_len
        && types.get(primary_type) == Some(&fields_json(fields))
}

pub fn domain_json(name: &str, version: &str, chain_id: u64, verifying_contract: &Address) -> Value {
    json!({
        "name": name,
        "version": version,
        "chainId": chain_id,
        "verifyingContract": address_to_hex(verifying_contract),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_table_with_and_without_domain() {
        let full = types_table(SPEND_PERMISSION, SPEND_PERMISSION_FIELDS);
        assert!(matches_types_table(&full, SPEND_PERMISSION, SPEND_PERMISSION_FIELDS));

        let mut bare = full.clone();
        bare.as_object_mut().unwrap().remove(EIP712_DOMAIN);
        assert!(matches_types_table(&bare, SPEND_PERMISSION, SPEND_PERMISSION_FIELDS));

        let mut extra = full.clone();
        extra["Permit"] = json!([]);
        assert!(!matches_types_table(&extra, SPEND_PERMISSION, SPEND_PERMISSION_FIELDS));

        let mut reordered = full;
        reordered[SPEND_PERMISSION].as_array_mut().unwrap().swap(0, 1);
        assert!(!matches_types_table(&reordered, SPEND_PERMISSION, SPEND_PERMISSION_FIELDS));
    }

    #[test]
    fn test_usdc_lookup() {
        assert_eq!(
            usdc_address(8453).map(|a| address_to_hex(&a)),
            Some("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913".to_string())
        );
        assert_eq!(usdc_address(10), None);
        assert_eq!(
            field_names(RECEIVE_WITH_AUTHORIZATION_FIELDS),
            ["from", "to", "value", "validAfter", "validBefore", "nonce"]
        );
    }
}
