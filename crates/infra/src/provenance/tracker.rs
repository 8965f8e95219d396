//! Selection-driven provenance tracking.
//!
//! The tracker follows the item currently selected by the consumer. It reconstructs
//! only when the selected identity changes (or on an explicit refresh) and never lets
//! a run started for an earlier selection overwrite the snapshot of a later one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::debug;
use uuid::Uuid;

use agritrace_core::{DomainResult, ItemDetails, ItemIdentity};

use crate::ledger::LedgerConnection;

use super::reconstructor::ProvenanceReconstructor;
use super::record::ProvenanceRecord;

/// Result of one completed reconstruction, as handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvenanceSnapshot {
    pub request_id: Uuid,
    pub item_code: String,
    pub record: ProvenanceRecord,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Selection {
    /// Bumped on every new run; a run may publish only if it still matches.
    epoch: u64,
    item_code: String,
    identity: Option<ItemIdentity>,
    snapshot: Option<ProvenanceSnapshot>,
}

/// Tracks the provenance of the currently selected item.
#[derive(Debug)]
pub struct ProvenanceTracker<C> {
    reconstructor: ProvenanceReconstructor<C>,
    selection: Mutex<Selection>,
    /// Latest epoch; in-flight runs watch it to stop early once superseded.
    epochs: watch::Sender<u64>,
}

impl<C> ProvenanceTracker<C> {
    pub fn new(reconstructor: ProvenanceReconstructor<C>) -> Self {
        Self {
            reconstructor,
            selection: Mutex::new(Selection::default()),
            epochs: watch::Sender::new(0),
        }
    }

    pub fn reconstructor(&self) -> &ProvenanceReconstructor<C> {
        &self.reconstructor
    }

    /// Latest published snapshot for the current selection.
    pub async fn current(&self) -> Option<ProvenanceSnapshot> {
        self.selection.lock().await.snapshot.clone()
    }
}

impl<C> ProvenanceTracker<C>
where
    C: LedgerConnection + 'static,
{
    /// Make `item_code` the current selection.
    ///
    /// Re-selecting the current identity returns the existing snapshot without
    /// querying. Returns `Ok(None)` when another selection (or refresh) superseded
    /// this one before it finished; its result is discarded.
    pub async fn select(&self, item_code: &str) -> DomainResult<Option<ProvenanceSnapshot>> {
        let identity = ItemIdentity::from_item_code(item_code)?;

        let epoch = {
            let mut selection = self.selection.lock().await;
            if selection.identity == identity {
                if let Some(snapshot) = &selection.snapshot {
                    return Ok(Some(snapshot.clone()));
                }
            }
            selection.epoch += 1;
            selection.item_code = item_code.to_string();
            selection.identity = identity;
            selection.snapshot = None;
            self.epochs.send_replace(selection.epoch);
            selection.epoch
        };

        Ok(self.run(epoch, item_code.to_string(), identity).await)
    }

    pub async fn select_item(
        &self,
        item: &ItemDetails,
    ) -> DomainResult<Option<ProvenanceSnapshot>> {
        self.select(&item.upc).await
    }

    /// Re-run the reconstruction for the current selection, e.g. after the write
    /// path reported a new transaction. The previous snapshot stays visible until
    /// the new one is published.
    pub async fn refresh(&self) -> Option<ProvenanceSnapshot> {
        let (epoch, item_code, identity) = {
            let mut selection = self.selection.lock().await;
            selection.epoch += 1;
            self.epochs.send_replace(selection.epoch);
            (selection.epoch, selection.item_code.clone(), selection.identity)
        };
        self.run(epoch, item_code, identity).await
    }

    async fn run(
        &self,
        epoch: u64,
        item_code: String,
        identity: Option<ItemIdentity>,
    ) -> Option<ProvenanceSnapshot> {
        let request_id = Uuid::now_v7();
        let mut epochs = self.epochs.subscribe();
        let reconstruction = async {
            match identity {
                Some(identity) => self.reconstructor.run(identity, request_id).await,
                None => ProvenanceRecord::not_attempted(),
            }
        };

        // Dropping the reconstruction aborts its outstanding stage lookups.
        let record = tokio::select! {
            record = reconstruction => record,
            _ = epochs.wait_for(|current| *current != epoch) => {
                debug!(%request_id, epoch, "selection changed; cancelled in-flight lookups");
                return None;
            }
        };
        let snapshot = ProvenanceSnapshot {
            request_id,
            item_code,
            record,
            completed_at: Utc::now(),
        };

        let mut selection = self.selection.lock().await;
        if selection.epoch != epoch {
            debug!(
                %request_id,
                epoch,
                current_epoch = selection.epoch,
                "discarding provenance for superseded selection"
            );
            return None;
        }
        selection.snapshot = Some(snapshot.clone());
        Some(snapshot)
    }
}
