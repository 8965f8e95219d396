//! Infrastructure layer: ledger connection, stage queries, provenance, config.

pub mod adapter;
pub mod config;
pub mod ledger;
pub mod provenance;


pub use adapter::{EventQueryAdapter, QueryUnavailable};
pub use config::{ConfigError, TraceConfig};
pub use provenance::{
    ProvenanceReconstructor, ProvenanceRecord, ProvenanceSnapshot, ProvenanceTracker,
    SelectionPolicy, StageStatus,
};
