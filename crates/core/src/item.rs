//! Item record as supplied by the item-selection collaborator.

use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::identity::ItemIdentity;
use crate::stage::Stage;

/// Descriptive fields of a tracked item, as read from the contract's item view.
///
/// Only `upc` and `item_state` carry meaning for provenance reconstruction; the rest
/// is passed through for display. Participant ids are ledger account addresses kept
/// as opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDetails {
    /// Stock Keeping Unit.
    pub sku: String,
    /// Universal Product Code, generated at harvest and printed on the package.
    pub upc: String,
    /// Current owner as the item moves through the lifecycle.
    pub owner_id: String,
    pub origin_farmer_id: String,
    pub origin_farm_name: String,
    pub origin_farm_information: String,
    pub origin_farm_latitude: String,
    pub origin_farm_longitude: String,
    pub product_id: String,
    pub product_notes: String,
    pub product_price: String,
    /// Stage name as reported by the contract (e.g. "ForSale").
    pub item_state: String,
    pub distributor_id: String,
    pub retailer_id: String,
    pub consumer_id: String,
}

impl ItemDetails {
    /// The "nothing selected" record.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn with_upc(upc: impl Into<String>) -> Self {
        Self {
            upc: upc.into(),
            ..Self::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.upc.is_empty()
    }

    /// Ledger identity of this item; `None` when no UPC is set.
    pub fn identity(&self) -> DomainResult<Option<ItemIdentity>> {
        ItemIdentity::from_item_code(&self.upc)
    }

    /// Current lifecycle stage according to the item view.
    ///
    /// Unknown or empty state names resolve to `None`.
    pub fn stage(&self) -> Option<Stage> {
        self.item_state.parse().ok()
    }
}
