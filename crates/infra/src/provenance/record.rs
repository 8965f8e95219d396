use serde::{Deserialize, Serialize};

use agritrace_core::{ItemIdentity, LogPosition, Stage, TxId};

use crate::adapter::QueryUnavailable;

/// Outcome of the lookup for one lifecycle stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// No item was selected, so no lookup ran.
    NotAttempted,
    /// The lookup ran and the ledger holds no event for this item at this stage.
    NotFound,
    /// The event for this item at this stage was written by `transaction_id`.
    Found {
        transaction_id: TxId,
        position: LogPosition,
    },
    /// The lookup could not run; nothing is known about this stage.
    Unavailable { reason: QueryUnavailable },
}

impl StageStatus {
    pub fn found(transaction_id: TxId, position: LogPosition) -> Self {
        Self::Found {
            transaction_id,
            position,
        }
    }

    pub fn unavailable(reason: QueryUnavailable) -> Self {
        Self::Unavailable { reason }
    }

    pub fn transaction_id(&self) -> Option<&TxId> {
        match self {
            StageStatus::Found { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, StageStatus::Found { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StageStatus::Unavailable { .. })
    }
}

/// Reconstructed stage → transaction mapping for one item.
///
/// A read-only snapshot produced per reconstruction; the ledger stays the system of
/// record. Partial records (some stages unavailable) are valid results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    identity: Option<ItemIdentity>,
    stages: [StageStatus; Stage::COUNT],
}

impl ProvenanceRecord {
    /// Record for "no item selected": every stage `NotAttempted`.
    pub fn not_attempted() -> Self {
        Self {
            identity: None,
            stages: std::array::from_fn(|_| StageStatus::NotAttempted),
        }
    }

    /// Assemble a record from per-stage outcomes indexed by `Stage::index()`.
    pub fn new(identity: ItemIdentity, stages: [StageStatus; Stage::COUNT]) -> Self {
        Self {
            identity: Some(identity),
            stages,
        }
    }

    pub fn identity(&self) -> Option<&ItemIdentity> {
        self.identity.as_ref()
    }

    pub fn was_attempted(&self) -> bool {
        self.identity.is_some()
    }

    pub fn status(&self, stage: Stage) -> &StageStatus {
        &self.stages[stage.index()]
    }

    pub fn transaction_id(&self, stage: Stage) -> Option<&TxId> {
        self.status(stage).transaction_id()
    }

    /// Every stage with its outcome, in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &StageStatus)> + '_ {
        Stage::ALL.into_iter().zip(self.stages.iter())
    }

    /// Stages the item is known to have reached, with their transactions, in
    /// lifecycle order.
    pub fn trail(&self) -> Vec<(Stage, &TxId)> {
        self.iter()
            .filter_map(|(stage, status)| status.transaction_id().map(|tx| (stage, tx)))
            .collect()
    }

    /// Furthest stage with a recorded event.
    pub fn latest_stage(&self) -> Option<Stage> {
        self.trail().last().map(|(stage, _)| *stage)
    }

    pub fn unavailable_stages(&self) -> Vec<Stage> {
        self.iter()
            .filter(|(_, status)| status.is_unavailable())
            .map(|(stage, _)| stage)
            .collect()
    }

    /// Every stage lookup ran and produced an answer (found or not found).
    ///
    /// Says nothing about how far the item got; see `reached_final_stage`.
    pub fn all_stages_resolved(&self) -> bool {
        self.was_attempted() && self.unavailable_stages().is_empty()
    }

    /// The item has a recorded event for the last lifecycle stage.
    pub fn reached_final_stage(&self) -> bool {
        self.status(Stage::Purchased).is_found()
    }
}
