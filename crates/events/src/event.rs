use serde::{Deserialize, Serialize};

use agritrace_core::{ItemIdentity, LogPosition, Stage, TxId};

use crate::log::{PayloadError, RawLogEntry};

/// A decoded stage-transition record.
///
/// Events are:
/// - **immutable** (treat them as facts; this crate never creates ledger records)
/// - **positioned** (`position` orders events on the ledger)
/// - not guaranteed unique per (item, stage): the ledger does not enforce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: Stage,
    pub item_identity: ItemIdentity,
    pub transaction_id: TxId,
    pub position: LogPosition,
}

impl StageEvent {
    /// Decode a raw log entry returned for a `stage` query.
    ///
    /// Fails when the entry announces a different event or its payload is not a
    /// single identity word.
    pub fn decode(stage: Stage, entry: &RawLogEntry) -> Result<Self, PayloadError> {
        match entry.event.stage() {
            Some(s) if s == stage => {}
            Some(_) => {
                return Err(PayloadError::StageMismatch {
                    expected: stage,
                    actual: entry.event.to_string(),
                });
            }
            None => return Err(PayloadError::NotAStageEvent(entry.event.to_string())),
        }

        Ok(Self {
            stage,
            item_identity: entry.data.decode_identity()?,
            transaction_id: entry.transaction_hash.clone(),
            position: entry.position,
        })
    }

    pub fn concerns(&self, identity: &ItemIdentity) -> bool {
        self.item_identity == *identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{EventSignature, LogData};
    use agritrace_core::ContractAddress;

    fn contract() -> ContractAddress {
        ContractAddress::from_bytes([7u8; 20])
    }

    fn entry(event: EventSignature, data: LogData) -> RawLogEntry {
        RawLogEntry {
            address: contract(),
            event,
            position: LogPosition::new(5, 1),
            transaction_hash: TxId::new("0xabc").unwrap(),
            data,
        }
    }

    #[test]
    fn decode_extracts_identity_and_transaction() {
        let id = ItemIdentity::from_u128(1001);
        let raw = entry(EventSignature::for_stage(Stage::Sold), LogData::for_identity(&id));

        let event = StageEvent::decode(Stage::Sold, &raw).unwrap();
        assert_eq!(event.stage, Stage::Sold);
        assert_eq!(event.item_identity, id);
        assert_eq!(event.transaction_id.as_str(), "0xabc");
        assert_eq!(event.position, LogPosition::new(5, 1));
        assert!(event.concerns(&id));
        assert!(!event.concerns(&ItemIdentity::from_u128(1002)));
    }

    #[test]
    fn decode_rejects_other_stage_events() {
        let id = ItemIdentity::from_u128(1);
        let raw = entry(EventSignature::for_stage(Stage::Packed), LogData::for_identity(&id));
        assert!(matches!(
            StageEvent::decode(Stage::Sold, &raw),
            Err(PayloadError::StageMismatch { expected: Stage::Sold, .. })
        ));

        let foreign = entry(
            EventSignature::new("Approval(address,uint256)"),
            LogData::for_identity(&id),
        );
        assert!(matches!(
            StageEvent::decode(Stage::Sold, &foreign),
            Err(PayloadError::NotAStageEvent(_))
        ));
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        let raw = entry(EventSignature::for_stage(Stage::Sold), LogData::new(vec![1, 2, 3]));
        assert!(matches!(
            StageEvent::decode(Stage::Sold, &raw),
            Err(PayloadError::WrongLength { .. })
        ));
    }
}
