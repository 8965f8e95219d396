//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of domain values (malformed codes,
/// addresses, stage names). Ledger connectivity belongs to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An item code could not be decoded into a ledger identity.
    #[error("invalid item code: {0}")]
    InvalidItemCode(String),

    /// A contract address was not a 20-byte hex value.
    #[error("invalid contract address: {0}")]
    InvalidAddress(String),

    /// A stage name did not match any lifecycle stage.
    #[error("unknown stage: {0}")]
    InvalidStage(String),

    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_item_code(msg: impl Into<String>) -> Self {
        Self::InvalidItemCode(msg.into())
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    pub fn invalid_stage(msg: impl Into<String>) -> Self {
        Self::InvalidStage(msg.into())
    }

    pub fn invalid_hex(msg: impl Into<String>) -> Self {
        Self::InvalidHex(msg.into())
    }
}
