use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use agritrace_core::{BlockNumber, ContractAddress, ItemIdentity, LogPosition, Stage, TxId};
use agritrace_events::{EventSignature, LogData, RawLogEntry};

use super::r#trait::{LedgerConnection, LedgerError, LogFilter};

/// In-memory append-only ledger log.
///
/// Intended for tests/dev. Queries scan every entry and return matches in append
/// order, which lets tests control the "natural iteration order" of a result set.
/// Connectivity failures can be injected per event type or for the whole ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    logs: RwLock<Vec<RawLogEntry>>,
    offline: AtomicBool,
    failing: RwLock<HashSet<EventSignature>>,
    queries: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<RawLogEntry>) -> Self {
        Self {
            logs: RwLock::new(entries),
            ..Self::default()
        }
    }

    /// Append a raw entry as-is (position and payload untouched).
    pub fn append(&self, entry: RawLogEntry) -> Result<(), LedgerError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))?;
        logs.push(entry);
        Ok(())
    }

    /// Record a stage event for `identity` in a new block after the current head.
    pub fn emit(
        &self,
        address: ContractAddress,
        stage: Stage,
        identity: ItemIdentity,
        transaction_hash: TxId,
    ) -> Result<LogPosition, LedgerError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))?;

        let head = logs
            .iter()
            .map(|e| e.position.block)
            .max()
            .unwrap_or(BlockNumber::GENESIS);
        let position = LogPosition {
            block: head.next(),
            log_index: 0,
        };

        logs.push(RawLogEntry {
            address,
            event: EventSignature::for_stage(stage),
            position,
            transaction_hash,
            data: LogData::for_identity(&identity),
        });
        Ok(position)
    }

    /// Make every query fail as if the node could not be reached.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make queries for `stage` events fail until `restore_stage` is called.
    pub fn fail_stage(&self, stage: Stage) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(EventSignature::for_stage(stage));
        }
    }

    pub fn restore_stage(&self, stage: Stage) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(&EventSignature::for_stage(stage));
        }
    }

    /// Number of `query_events` calls served (including failed ones).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.logs.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored entry in append order.
    pub fn entries(&self) -> Result<Vec<RawLogEntry>, LedgerError> {
        self.logs
            .read()
            .map(|l| l.clone())
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl LedgerConnection for InMemoryLedger {
    async fn query_events(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unreachable("ledger is offline".to_string()));
        }

        let rejected = self
            .failing
            .read()
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))?
            .contains(&filter.event);
        if rejected {
            return Err(LedgerError::Rejected(format!(
                "query for {} failed",
                filter.event
            )));
        }

        let logs = self
            .logs
            .read()
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))?;

        Ok(logs.iter().filter(|e| filter.matches(e)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> ContractAddress {
        ContractAddress::from_bytes([1u8; 20])
    }

    fn tx(s: &str) -> TxId {
        TxId::new(s).unwrap()
    }

    #[tokio::test]
    async fn emit_assigns_increasing_blocks() {
        let ledger = InMemoryLedger::new();
        let id = ItemIdentity::from_u128(7);

        let p1 = ledger.emit(contract(), Stage::Harvested, id, tx("0x01")).unwrap();
        let p2 = ledger.emit(contract(), Stage::Processed, id, tx("0x02")).unwrap();

        assert_eq!(p1, LogPosition::new(1, 0));
        assert_eq!(p2, LogPosition::new(2, 0));
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn query_filters_by_address_event_and_block() {
        let ledger = InMemoryLedger::new();
        let other = ContractAddress::from_bytes([2u8; 20]);
        let id = ItemIdentity::from_u128(7);

        ledger.emit(contract(), Stage::Harvested, id, tx("0x01")).unwrap();
        ledger.emit(other, Stage::Harvested, id, tx("0x02")).unwrap();
        ledger.emit(contract(), Stage::Packed, id, tx("0x03")).unwrap();
        ledger.emit(contract(), Stage::Harvested, id, tx("0x04")).unwrap();

        let all = ledger
            .query_events(&LogFilter::for_stage(contract(), Stage::Harvested, BlockNumber::GENESIS))
            .await
            .unwrap();
        let hashes: Vec<_> = all.iter().map(|e| e.transaction_hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x01", "0x04"]);

        let late = ledger
            .query_events(&LogFilter::for_stage(contract(), Stage::Harvested, BlockNumber(2)))
            .await
            .unwrap();
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].transaction_hash.as_str(), "0x04");
        assert_eq!(ledger.query_count(), 2);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let ledger = InMemoryLedger::new();
        let filter = LogFilter::for_stage(contract(), Stage::Sold, BlockNumber::GENESIS);

        ledger.fail_stage(Stage::Sold);
        assert!(matches!(
            ledger.query_events(&filter).await,
            Err(LedgerError::Rejected(_))
        ));
        ledger.restore_stage(Stage::Sold);
        assert!(ledger.query_events(&filter).await.unwrap().is_empty());

        ledger.set_offline(true);
        assert!(matches!(
            ledger.query_events(&filter).await,
            Err(LedgerError::Unreachable(_))
        ));
        assert_eq!(ledger.query_count(), 3);
    }
}
