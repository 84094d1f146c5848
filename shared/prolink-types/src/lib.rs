//! Shared wire types for prolink payloads (envelope, shortcut payloads, tags).
//!
//! These types carry no codec logic; the byte layout lives in the `prolink` crate.

#![no_std]

extern crate alloc;

pub mod envelope;
pub mod payloads;
pub mod tags;

pub use envelope::{CapabilityBytes, Envelope, PROTOCOL_VERSION};
pub use payloads::{
    Call, GenericRpcPayload, ReceiveWithAuthorization, ShortcutPayload, SignatureData,
    SpendPermission, TransactionData, WalletSendCallsPayload, WalletSignPayload,
};
pub use tags::{CompressionFlag, ShortcutTag, SignatureKind, TransactionKind};
