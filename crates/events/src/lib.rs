//! Ledger event model: raw log entries and decoded stage events.

pub mod event;
pub mod log;

pub use event::StageEvent;
pub use log::{EventSignature, LogData, PayloadError, RawLogEntry};
