//! Provenance reconstruction (read side of the supply-chain ledger).
//!
//! Given an item code, rebuild which lifecycle stages the item has reached and
//! which ledger transaction recorded each one. All state here is:
//! - **Derived**: the ledger is the system of record; records are snapshots
//! - **Per request**: nothing is cached across reconstructions
//! - **Per stage**: a failed stage lookup never affects the other seven

pub mod reconstructor;
pub mod record;
pub mod tracker;

pub use reconstructor::{ProvenanceReconstructor, SelectionPolicy};
pub use record::{ProvenanceRecord, StageStatus};
pub use tracker::{ProvenanceSnapshot, ProvenanceTracker};
