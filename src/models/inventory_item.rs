use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lpn::Lpn;
use crate::models::rack::RackLocation;

/// Product code recorded on mixed pallets.
pub const MIXED_PALLET_CODE: &str = "MIXED-PALLET";

/// One product line on a mixed pallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MixedItem {
    #[validate(length(min = 1))]
    pub product_code: String,
    pub product_name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub expiration_date: NaiveDate,
}

/// What a pallet physically holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PalletContents {
    Single {
        product_code: String,
        product_name: String,
        quantity: u32,
    },
    Mixed {
        items: Vec<MixedItem>,
    },
}

impl PalletContents {
    /// Total units; sum of lines for mixed pallets.
    pub fn quantity(&self) -> u64 {
        match self {
            PalletContents::Single { quantity, .. } => u64::from(*quantity),
            PalletContents::Mixed { items } => items.iter().map(|i| u64::from(i.quantity)).sum(),
        }
    }

    pub fn product_code(&self) -> &str {
        match self {
            PalletContents::Single { product_code, .. } => product_code,
            PalletContents::Mixed { .. } => MIXED_PALLET_CODE,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            PalletContents::Single { product_name, .. } => product_name.clone(),
            PalletContents::Mixed { items } => format!("MIXED PALLET ({} refs)", items.len()),
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, PalletContents::Mixed { .. })
    }

    /// Earliest line expiration of a mixed pallet.
    pub fn critical_expiration(&self) -> Option<NaiveDate> {
        match self {
            PalletContents::Single { .. } => None,
            PalletContents::Mixed { items } => items.iter().map(|i| i.expiration_date).min(),
        }
    }
}

/// A received unit tracked by LPN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub lpn: Lpn,
    pub contents: PalletContents,
    pub expiration_date: NaiveDate,
    pub reception_date: DateTime<Utc>,
    pub received_by: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    /// `None` while the item waits to be shelved.
    pub location: Option<RackLocation>,
}

impl InventoryItem {
    pub fn is_pending(&self) -> bool {
        self.location.is_none()
    }

    pub fn quantity(&self) -> u64 {
        self.contents.quantity()
    }

    /// `(product_code, expiration)` for every product on the pallet.
    pub fn product_expirations(&self) -> Vec<(&str, NaiveDate)> {
        match &self.contents {
            PalletContents::Single { product_code, .. } => {
                vec![(product_code.as_str(), self.expiration_date)]
            }
            PalletContents::Mixed { items } => items
                .iter()
                .map(|i| (i.product_code.as_str(), i.expiration_date))
                .collect(),
        }
    }
}
