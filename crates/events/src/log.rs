use serde::{Deserialize, Serialize};
use thiserror::Error;

use agritrace_core::identity::WORD_BYTES;
use agritrace_core::{hex, ContractAddress, ItemIdentity, LogPosition, Stage, TxId};

/// Event-type selector: the canonical signature of a contract event.
///
/// This is the only predicate the ledger's log query can filter on besides the
/// emitting address. It says nothing about which item an event concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSignature(String);

impl EventSignature {
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    pub fn for_stage(stage: Stage) -> Self {
        Self(stage.event_signature().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lifecycle stage this signature announces, if it is a stage event.
    pub fn stage(&self) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|s| s.event_signature() == self.0)
    }
}

impl core::fmt::Display for EventSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw, ABI-encoded data section of a log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogData(#[serde(with = "agritrace_core::hex::serde_bytes")] Vec<u8>);

impl LogData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Payload of a stage event for `identity`: one big-endian word.
    pub fn for_identity(identity: &ItemIdentity) -> Self {
        Self(identity.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode the single `uint256` argument of a stage event.
    pub fn decode_identity(&self) -> Result<ItemIdentity, PayloadError> {
        let word: [u8; WORD_BYTES] =
            self.0
                .as_slice()
                .try_into()
                .map_err(|_| PayloadError::WrongLength {
                    expected: WORD_BYTES,
                    actual: self.0.len(),
                })?;
        Ok(ItemIdentity::from_word(word))
    }
}

impl core::fmt::Display for LogData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Payload decoding failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is {actual} bytes, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("log entry is a '{0}' event, not a stage event")]
    NotAStageEvent(String),

    #[error("log entry is a '{actual}' event, expected '{expected}'")]
    StageMismatch { expected: Stage, actual: String },
}

/// One log entry as returned by the ledger's log query.
///
/// The ledger returns these as an unordered set. `transaction_hash` is opaque and
/// `data` still has to be decoded before it says anything about an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogEntry {
    pub address: ContractAddress,
    pub event: EventSignature,
    pub position: LogPosition,
    pub transaction_hash: TxId,
    pub data: LogData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_maps_back_to_stage() {
        for stage in Stage::ALL {
            assert_eq!(EventSignature::for_stage(stage).stage(), Some(stage));
        }
        assert_eq!(EventSignature::new("Transfer(address,address,uint256)").stage(), None);
    }

    #[test]
    fn payload_word_decodes_to_identity() {
        let id = ItemIdentity::from_u128(0xabc);
        assert_eq!(LogData::for_identity(&id).decode_identity().unwrap(), id);
    }

    #[test]
    fn payload_must_be_exactly_one_word() {
        let short = LogData::new(vec![0x0a, 0xbc]);
        assert_eq!(
            short.decode_identity(),
            Err(PayloadError::WrongLength {
                expected: WORD_BYTES,
                actual: 2
            })
        );
        assert!(LogData::new(vec![0u8; 64]).decode_identity().is_err());
        assert!(LogData::default().decode_identity().is_err());
    }

    #[test]
    fn raw_entry_reads_from_json() {
        let json = format!(
            r#"{{
                "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "event": "Packed(uint256)",
                "position": {{ "block": 12, "log_index": 0 }},
                "transaction_hash": "0xabc",
                "data": "0x{:064x}"
            }}"#,
            42
        );
        let entry: RawLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.event.stage(), Some(Stage::Packed));
        assert_eq!(entry.position, LogPosition::new(12, 0));
        assert_eq!(entry.data.decode_identity().unwrap(), ItemIdentity::from_u128(42));
    }
}
