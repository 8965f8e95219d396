use serde::{Deserialize, Serialize};
use thiserror::Error;

use agritrace_core::{BlockNumber, ContractAddress, Stage};
use agritrace_events::{EventSignature, RawLogEntry};
use std::sync::Arc;

/// Log query predicate understood by the ledger.
///
/// The ledger indexes logs by emitting address and event type only. There is no way
/// to ask for "events about item X"; that filtering happens client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub address: ContractAddress,
    pub event: EventSignature,
    /// Lower bound (inclusive) on the block of returned entries.
    pub from_block: BlockNumber,
}

impl LogFilter {
    /// Filter for every `stage` event emitted by `address` since `from_block`.
    pub fn for_stage(address: ContractAddress, stage: Stage, from_block: BlockNumber) -> Self {
        Self {
            address,
            event: EventSignature::for_stage(stage),
            from_block,
        }
    }

    pub fn matches(&self, entry: &RawLogEntry) -> bool {
        entry.address == self.address
            && entry.event == self.event
            && entry.position.block >= self.from_block
    }
}

/// Ledger connection error.
///
/// These are **connectivity/backend errors**: the query did not run, so nothing can
/// be concluded about which events exist.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("query rejected by ledger: {0}")]
    Rejected(String),

    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// Read-only log query capability of a ledger node/provider.
///
/// ## Query Semantics
///
/// `query_events()`:
/// - Returns every log entry matching `filter` (address, event type, block lower bound)
/// - Returns entries as an **unordered set**: callers must not rely on iteration order
/// - Performs no filtering on payload content
/// - Has no side effects
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - Report connectivity problems as `LedgerError` (never as an empty result)
/// - Never return entries below `filter.from_block`
#[async_trait::async_trait]
pub trait LedgerConnection: Send + Sync {
    async fn query_events(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError>;
}

#[async_trait::async_trait]
impl<C> LedgerConnection for Arc<C>
where
    C: LedgerConnection + ?Sized,
{
    async fn query_events(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError> {
        (**self).query_events(filter).await
    }
}
