//! `agritrace-core`: supply-chain domain building blocks.
//!
//! This crate contains **pure domain** primitives (no ledger IO).

pub mod error;
pub mod hex;
pub mod identity;
pub mod item;
pub mod ledger;
pub mod stage;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use identity::ItemIdentity;
pub use item::ItemDetails;
pub use ledger::{BlockNumber, ContractAddress, LogPosition, TxId};
pub use stage::Stage;
pub use value_object::ValueObject;
