use alloc::{collections::BTreeMap, string::String, vec::Vec};

use alloy_primitives::Address;

use crate::payloads::ShortcutPayload;

/// Only protocol version understood by this codec.
pub const PROTOCOL_VERSION: u8 = 1;

/// Capability map as carried on the wire: key -> UTF-8 JSON text of the value.
///
/// A `BTreeMap` so iteration (and therefore the encoded byte order) is sorted by key.
pub type CapabilityBytes = BTreeMap<String, Vec<u8>>;

/// Top-level wire record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Protocol version for forwards compatibility.
    pub protocol_version: u8,
    pub chain_id: u64,
    /// Sender address, when the request names one outside the shortcut payload.
    pub from: Option<Address>,
    pub shortcut: ShortcutPayload,
    pub capabilities: Option<CapabilityBytes>,
}

impl Envelope {
    /// New v1 envelope without sender or capabilities.
    pub fn new(chain_id: u64, shortcut: ShortcutPayload) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            chain_id,
            from: None,
            shortcut,
            capabilities: None,
        }
    }
}
