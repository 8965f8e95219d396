//! Ledger connection boundary.
//!
//! This module defines the read-only log query interface of the shared ledger plus
//! the in-process connections used for tests and offline snapshots. Connecting to a
//! live node is left to implementors of `LedgerConnection`.

pub mod in_memory;
pub mod json_snapshot;
pub mod r#trait;

pub use in_memory::InMemoryLedger;
pub use json_snapshot::JsonLedgerSnapshot;
pub use r#trait::{LedgerConnection, LedgerError, LogFilter};
