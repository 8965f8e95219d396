//! Ledger snapshot loaded from a JSON export of log entries.
//!
//! File format:
//!
//! ```json
//! { "logs": [ { "address": "0x…", "event": "Harvested(uint256)",
//!               "position": { "block": 1, "log_index": 0 },
//!               "transaction_hash": "0x…", "data": "0x…" } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use agritrace_events::RawLogEntry;

use super::in_memory::InMemoryLedger;
use super::r#trait::{LedgerConnection, LedgerError, LogFilter};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub logs: Vec<RawLogEntry>,
}

/// Read-only ledger served from a point-in-time export.
#[derive(Debug)]
pub struct JsonLedgerSnapshot {
    ledger: InMemoryLedger,
}

impl JsonLedgerSnapshot {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LedgerError::Unreachable(format!("{}: {e}", path.display())))?;
        let snapshot = Self::from_json(&raw)?;
        tracing::debug!(path = %path.display(), entries = snapshot.len(), "loaded ledger snapshot");
        Ok(snapshot)
    }

    pub fn from_json(raw: &str) -> Result<Self, LedgerError> {
        let file: SnapshotFile = serde_json::from_str(raw)
            .map_err(|e| LedgerError::Backend(format!("invalid snapshot: {e}")))?;
        Ok(Self {
            ledger: InMemoryLedger::from_entries(file.logs),
        })
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

#[async_trait::async_trait]
impl LedgerConnection for JsonLedgerSnapshot {
    async fn query_events(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError> {
        self.ledger.query_events(filter).await
    }
}
