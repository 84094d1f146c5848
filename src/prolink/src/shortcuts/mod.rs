//! Shortcut codecs: JSON request params <-> typed shortcut payloads.
//!
//! `wallet_sendCalls` and `wallet_sign` each specialize common shapes into a few bytes and
//! fall back to a lossless generic form; `generic_rpc` carries everything else.

pub mod eip712;
pub mod generic_rpc;
pub mod wallet_send_calls;
pub mod wallet_sign;
