use alloc::{string::String, vec::Vec};

use alloy_primitives::{Address, B256, U256};

use crate::tags::{ShortcutTag, SignatureKind, TransactionKind};

/// The envelope's shortcut union; exactly one variant per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShortcutPayload {
    GenericRpc(GenericRpcPayload),
    WalletSendCalls(WalletSendCallsPayload),
    WalletSign(WalletSignPayload),
}

impl ShortcutPayload {
    pub fn tag(&self) -> ShortcutTag {
        match self {
            ShortcutPayload::GenericRpc(_) => ShortcutTag::GenericRpc,
            ShortcutPayload::WalletSendCalls(_) => ShortcutTag::WalletSendCalls,
            ShortcutPayload::WalletSign(_) => ShortcutTag::WalletSign,
        }
    }
}

/// Fallback representation for any JSON-RPC method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericRpcPayload {
    pub method: String,
    /// UTF-8 JSON text of the request params.
    pub params_json: Vec<u8>,
    pub rpc_version: String,
}

/// EIP-5792 `wallet_sendCalls`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletSendCallsPayload {
    pub version: String,
    pub from: Option<Address>,
    pub transaction_data: TransactionData,
}

/// Specialized call-bundle shapes, checked in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionData {
    /// Single zero-value `transfer(address,uint256)` call against `token`.
    Erc20Transfer {
        token: Address,
        recipient: Address,
        amount: U256,
    },
    /// Single call with empty data and non-zero value.
    NativeTransfer { recipient: Address, amount: U256 },
    GenericCalls { calls: Vec<Call> },
}

impl TransactionData {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionData::Erc20Transfer { .. } => TransactionKind::Erc20Transfer,
            TransactionData::NativeTransfer { .. } => TransactionKind::NativeTransfer,
            TransactionData::GenericCalls { .. } => TransactionKind::GenericCalls,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    /// Raw calldata; empty when the call had none.
    pub data: Vec<u8>,
    pub value: U256,
}

/// EIP-7871 `wallet_sign`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletSignPayload {
    pub version: String,
    pub signature_data: SignatureData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureData {
    SpendPermission(SpendPermission),
    ReceiveWithAuthorization(ReceiveWithAuthorization),
    /// Entire EIP-712 object as UTF-8 JSON.
    GenericTypedData { typed_data_json: Vec<u8> },
}

impl SignatureData {
    pub fn kind(&self) -> SignatureKind {
        match self {
            SignatureData::SpendPermission(_) => SignatureKind::SpendPermission,
            SignatureData::ReceiveWithAuthorization(_) => SignatureKind::ReceiveWithAuthorization,
            SignatureData::GenericTypedData { .. } => SignatureKind::GenericTypedData,
        }
    }
}

/// Spend permission message. The verifying contract, chain id and type table are implied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendPermission {
    pub account: Address,
    pub spender: Address,
    pub token: Address,
    pub allowance: U256,
    pub period: U256,
    pub start: U256,
    pub end: U256,
    pub salt: B256,
    pub extra_data: Vec<u8>,
    pub domain_name: String,
    pub domain_version: String,
}

/// ERC-3009 `ReceiveWithAuthorization` message against the chain's native USDC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveWithAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub valid_after: U256,
    pub valid_before: U256,
    pub nonce: B256,
    pub domain_name: String,
    pub domain_version: String,
}
