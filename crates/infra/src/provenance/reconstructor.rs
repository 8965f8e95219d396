//! Provenance reconstruction: one stage query per lifecycle stage, matched
//! client-side against the item's identity.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

use agritrace_core::{BlockNumber, DomainError, DomainResult, ItemIdentity, Stage};
use agritrace_events::StageEvent;

use crate::adapter::{EventQueryAdapter, QueryUnavailable};
use crate::ledger::LedgerConnection;

use super::record::{ProvenanceRecord, StageStatus};

/// Tie-break applied when the ledger holds more than one event for the same
/// (item, stage) pair, e.g. after a retried write.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The match with the lowest ledger position wins. Independent of the order in
    /// which the ledger returns entries.
    #[default]
    EarliestPosition,
    /// The first match in the ledger's result order wins.
    FirstInIterationOrder,
}

impl SelectionPolicy {
    /// Pick the event for `identity` out of one stage's result set.
    pub fn select<'a>(
        self,
        identity: &ItemIdentity,
        events: &'a [StageEvent],
    ) -> Option<&'a StageEvent> {
        let mut matches = events.iter().filter(|e| e.concerns(identity));
        match self {
            SelectionPolicy::EarliestPosition => matches.min_by_key(|e| e.position),
            SelectionPolicy::FirstInIterationOrder => matches.next(),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" | "earliest_position" => Ok(SelectionPolicy::EarliestPosition),
            "first" | "first_in_iteration_order" => Ok(SelectionPolicy::FirstInIterationOrder),
            other => Err(DomainError::validation(format!(
                "unknown selection policy '{other}' (expected earliest or first)"
            ))),
        }
    }
}

/// Rebuilds an item's stage → transaction trail from the ledger.
///
/// Each call queries all eight stages concurrently from the genesis block and
/// returns a fresh record; nothing is cached between calls.
#[derive(Debug)]
pub struct ProvenanceReconstructor<C> {
    adapter: Arc<EventQueryAdapter<C>>,
    policy: SelectionPolicy,
}

impl<C> ProvenanceReconstructor<C> {
    pub fn new(adapter: EventQueryAdapter<C>) -> Self {
        Self {
            adapter: Arc::new(adapter),
            policy: SelectionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn adapter(&self) -> &EventQueryAdapter<C> {
        &self.adapter
    }
}

impl<C> ProvenanceReconstructor<C>
where
    C: LedgerConnection + 'static,
{
    /// Reconstruct the trail for an item code.
    ///
    /// The empty code means no item is selected: every stage is `NotAttempted` and
    /// the ledger is not queried. A non-empty code that is not a valid item code is
    /// an error.
    pub async fn reconstruct(&self, item_code: &str) -> DomainResult<ProvenanceRecord> {
        match ItemIdentity::from_item_code(item_code)? {
            Some(identity) => Ok(self.reconstruct_identity(identity).await),
            None => {
                debug!("no item selected; skipping ledger queries");
                Ok(ProvenanceRecord::not_attempted())
            }
        }
    }

    pub async fn reconstruct_identity(&self, identity: ItemIdentity) -> ProvenanceRecord {
        self.run(identity, Uuid::now_v7()).await
    }

    #[instrument(skip_all, fields(identity = %identity, request_id = %request_id))]
    pub(crate) async fn run(&self, identity: ItemIdentity, request_id: Uuid) -> ProvenanceRecord {
        // Slots left untouched by a failed task stay unavailable.
        let mut stages: [StageStatus; Stage::COUNT] = std::array::from_fn(|_| {
            StageStatus::unavailable(QueryUnavailable::Interrupted("no result".to_string()))
        });

        let mut lookups = JoinSet::new();
        let mut tasks = HashMap::with_capacity(Stage::COUNT);
        for stage in Stage::ALL {
            let adapter = Arc::clone(&self.adapter);
            let policy = self.policy;
            let handle = lookups.spawn(
                async move {
                    match adapter.query(stage, BlockNumber::GENESIS).await {
                        Ok(events) => resolve(stage, &identity, &events, policy),
                        Err(e) => StageStatus::unavailable(e),
                    }
                }
                .in_current_span(),
            );
            tasks.insert(handle.id(), stage);
        }

        while let Some(joined) = lookups.join_next_with_id().await {
            match joined {
                Ok((id, status)) => {
                    if let Some(stage) = tasks.get(&id) {
                        stages[stage.index()] = status;
                    }
                }
                Err(e) => {
                    let stage = tasks.get(&e.id()).copied();
                    warn!(?stage, error = %e, "stage lookup task failed");
                    if let Some(stage) = stage {
                        stages[stage.index()] =
                            StageStatus::unavailable(QueryUnavailable::Interrupted(e.to_string()));
                    }
                }
            }
        }

        let record = ProvenanceRecord::new(identity, stages);
        let unavailable = record.unavailable_stages();
        if !unavailable.is_empty() {
            warn!(?unavailable, "some stages could not be queried");
        }
        info!(
            found = record.trail().len(),
            latest = ?record.latest_stage(),
            "reconstructed provenance"
        );
        record
    }
}

fn resolve(
    stage: Stage,
    identity: &ItemIdentity,
    events: &[StageEvent],
    policy: SelectionPolicy,
) -> StageStatus {
    let matches = events.iter().filter(|e| e.concerns(identity)).count();
    if matches > 1 {
        warn!(%stage, matches, ?policy, "multiple events for one item at one stage");
    }

    match policy.select(identity, events) {
        Some(event) => StageStatus::found(event.transaction_id.clone(), event.position),
        None => StageStatus::NotFound,
    }
}
