//! Event query adapter: stage-scoped reads over the ledger's log query.
//!
//! The adapter turns "all `<stage>` events since block N" into a ledger `LogFilter`,
//! runs it, and decodes the returned entries into `StageEvent`s. It never filters by
//! item identity.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use agritrace_core::{BlockNumber, ContractAddress, Stage};
use agritrace_events::StageEvent;

use crate::ledger::{LedgerConnection, LedgerError, LogFilter};

/// The query for a stage could not be executed.
///
/// This means "stage result indeterminate", never "stage absent".
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum QueryUnavailable {
    /// No contract address is known, so no stage selector can be built.
    #[error("stage selector unresolved: contract address not configured")]
    SelectorUnresolved,

    #[error(transparent)]
    Connection(#[from] LedgerError),

    /// The lookup task ended without a result (panicked or was aborted).
    #[error("stage lookup did not complete: {0}")]
    Interrupted(String),
}

/// Stage-scoped read adapter over a `LedgerConnection`.
#[derive(Debug)]
pub struct EventQueryAdapter<C> {
    connection: C,
    contract: Option<ContractAddress>,
}

impl<C> EventQueryAdapter<C> {
    pub fn new(connection: C, contract: Option<ContractAddress>) -> Self {
        Self {
            connection,
            contract,
        }
    }

    pub fn contract(&self) -> Option<ContractAddress> {
        self.contract
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Build the ledger filter for `stage` events at or after `from`.
    pub fn selector(&self, stage: Stage, from: BlockNumber) -> Result<LogFilter, QueryUnavailable> {
        let address = self.contract.ok_or(QueryUnavailable::SelectorUnresolved)?;
        Ok(LogFilter::for_stage(address, stage, from))
    }
}

impl<C> EventQueryAdapter<C>
where
    C: LedgerConnection,
{
    /// Every `stage` event on the ledger at or after `from`, in the ledger's order.
    ///
    /// Entries whose payload cannot be decoded are dropped with a warning: they
    /// cannot denote any item identity. Failures are not retried.
    #[instrument(skip_all, fields(stage = %stage, from = %from), err)]
    pub async fn query(
        &self,
        stage: Stage,
        from: BlockNumber,
    ) -> Result<Vec<StageEvent>, QueryUnavailable> {
        let filter = self.selector(stage, from)?;
        let entries = self.connection.query_events(&filter).await?;

        let mut events = Vec::with_capacity(entries.len());
        for entry in &entries {
            match StageEvent::decode(stage, entry) {
                Ok(event) => events.push(event),
                Err(e) => warn!(
                    tx = %entry.transaction_hash,
                    position = %entry.position,
                    error = %e,
                    "skipping undecodable log entry"
                ),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agritrace_core::{ItemIdentity, LogPosition, TxId};
    use agritrace_events::{EventSignature, LogData, RawLogEntry};

    use crate::ledger::InMemoryLedger;

    fn contract() -> ContractAddress {
        ContractAddress::from_bytes([9u8; 20])
    }

    fn tx(s: &str) -> TxId {
        TxId::new(s).unwrap()
    }

    #[tokio::test]
    async fn query_returns_every_stage_event_regardless_of_item() {
        let ledger = InMemoryLedger::new();
        let a = ItemIdentity::from_u128(1);
        let b = ItemIdentity::from_u128(2);
        ledger.emit(contract(), Stage::Packed, a, tx("0xa")).unwrap();
        ledger.emit(contract(), Stage::Packed, b, tx("0xb")).unwrap();
        ledger.emit(contract(), Stage::Sold, a, tx("0xc")).unwrap();

        let adapter = EventQueryAdapter::new(ledger, Some(contract()));
        let events = adapter.query(Stage::Packed, BlockNumber::GENESIS).await.unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.stage == Stage::Packed));
        assert_eq!(events[0].item_identity, a);
        assert_eq!(events[1].item_identity, b);
    }

    #[tokio::test]
    async fn missing_contract_is_unavailable_without_querying() {
        let adapter = EventQueryAdapter::new(InMemoryLedger::new(), None);
        let err = adapter.query(Stage::Harvested, BlockNumber::GENESIS).await.unwrap_err();

        assert_eq!(err, QueryUnavailable::SelectorUnresolved);
        assert_eq!(adapter.connection().query_count(), 0);
    }

    #[tokio::test]
    async fn connection_failure_is_unavailable() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);
        let adapter = EventQueryAdapter::new(ledger, Some(contract()));

        assert!(matches!(
            adapter.query(Stage::Harvested, BlockNumber::GENESIS).await,
            Err(QueryUnavailable::Connection(LedgerError::Unreachable(_)))
        ));
    }

    #[tokio::test]
    async fn undecodable_entries_are_skipped() {
        let ledger = InMemoryLedger::new();
        ledger
            .append(RawLogEntry {
                address: contract(),
                event: EventSignature::for_stage(Stage::Shipped),
                position: LogPosition::new(1, 0),
                transaction_hash: tx("0xbad"),
                data: LogData::new(vec![1, 2, 3]),
            })
            .unwrap();
        let id = ItemIdentity::from_u128(5);
        ledger.emit(contract(), Stage::Shipped, id, tx("0xgood")).unwrap();

        let adapter = EventQueryAdapter::new(ledger, Some(contract()));
        let events = adapter.query(Stage::Shipped, BlockNumber::GENESIS).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transaction_id.as_str(), "0xgood");
    }
}
