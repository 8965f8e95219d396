//! Supply-chain lifecycle stages.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the eight fixed lifecycle stages of an item.
///
/// The ordering is the lifecycle order and is domain truth: it is never inferred from
/// the ledger. Discriminants match the contract's `State` enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Harvested = 0,
    Processed = 1,
    Packed = 2,
    ForSale = 3,
    Sold = 4,
    Shipped = 5,
    Received = 6,
    Purchased = 7,
}

impl Stage {
    /// Number of lifecycle stages.
    pub const COUNT: usize = 8;

    /// All stages in lifecycle order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Harvested,
        Stage::Processed,
        Stage::Packed,
        Stage::ForSale,
        Stage::Sold,
        Stage::Shipped,
        Stage::Received,
        Stage::Purchased,
    ];

    /// Position in the lifecycle (0-based).
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stage name as used by the contract's events and the item-state field.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Harvested => "Harvested",
            Stage::Processed => "Processed",
            Stage::Packed => "Packed",
            Stage::ForSale => "ForSale",
            Stage::Sold => "Sold",
            Stage::Shipped => "Shipped",
            Stage::Received => "Received",
            Stage::Purchased => "Purchased",
        }
    }

    /// Signature of the ledger event emitted when an item enters this stage.
    ///
    /// Every stage event carries a single non-indexed `uint256 upc` argument.
    pub const fn event_signature(self) -> &'static str {
        match self {
            Stage::Harvested => "Harvested(uint256)",
            Stage::Processed => "Processed(uint256)",
            Stage::Packed => "Packed(uint256)",
            Stage::ForSale => "ForSale(uint256)",
            Stage::Sold => "Sold(uint256)",
            Stage::Shipped => "Shipped(uint256)",
            Stage::Received => "Received(uint256)",
            Stage::Purchased => "Purchased(uint256)",
        }
    }

    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| DomainError::invalid_stage(s))
    }
}
