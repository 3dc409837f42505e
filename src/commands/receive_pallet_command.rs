use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    commands::Command,
    errors::{InventoryError, ServiceError},
    lpn::Lpn,
    models::inventory_item::{InventoryItem, MixedItem, PalletContents},
    services::{
        expiration::DEFAULT_WARNING_DAYS,
        receiving::{self, ReceptionWarning},
    },
    warehouse::Warehouse,
};

/// Registers a pallet at the dock. The new item is pending until shelved.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceivePalletCommand {
    pub contents: PalletContents,
    /// Required for single-product pallets; mixed pallets use their
    /// earliest line date.
    pub expiration_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub received_by: String,
    pub received_at: DateTime<Utc>,
    #[serde(default = "default_warning_days")]
    #[validate(range(min = 0, max = 365))]
    pub warning_days: i64,
}

fn default_warning_days() -> i64 {
    DEFAULT_WARNING_DAYS
}

impl ReceivePalletCommand {
    pub fn single(
        product_code: impl Into<String>,
        product_name: impl Into<String>,
        quantity: u32,
        expiration_date: NaiveDate,
        received_by: impl Into<String>,
    ) -> Self {
        Self {
            contents: PalletContents::Single {
                product_code: product_code.into(),
                product_name: product_name.into(),
                quantity,
            },
            expiration_date: Some(expiration_date),
            received_by: received_by.into(),
            received_at: Utc::now(),
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }

    pub fn mixed(items: Vec<MixedItem>, received_by: impl Into<String>) -> Self {
        Self {
            contents: PalletContents::Mixed { items },
            expiration_date: None,
            received_by: received_by.into(),
            received_at: Utc::now(),
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }

    pub fn at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn with_warning_days(mut self, warning_days: i64) -> Self {
        self.warning_days = warning_days;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceivePalletResult {
    pub item: InventoryItem,
    pub warnings: Vec<ReceptionWarning>,
}

impl Command for ReceivePalletCommand {
    type Result = ReceivePalletResult;

    #[instrument(skip(self, warehouse), fields(received_by = %self.received_by))]
    fn execute(&self, warehouse: &mut Warehouse) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        receiving::validate_contents(&self.contents)?;
        let expiration_date = receiving::pallet_expiration(&self.contents, self.expiration_date)?;

        let today = self.received_at.date_naive();
        let warnings = receiving::reception_warnings(
            &warehouse.inventory,
            &self.contents,
            expiration_date,
            today,
            self.warning_days,
        );

        let candidate = Lpn::generate(today, warehouse.sequence.peek());
        if warehouse.inventory.find(candidate.as_str()).is_some() {
            return Err(InventoryError::DuplicateLpn(candidate).into());
        }
        let lpn = warehouse.sequence.issue(today);
        let item = InventoryItem {
            lpn: lpn.clone(),
            contents: self.contents.clone(),
            expiration_date,
            reception_date: self.received_at,
            received_by: self.received_by.trim().to_string(),
            photos: Vec::new(),
            location: None,
        };
        warehouse.inventory.insert(item.clone())?;

        for warning in &warnings {
            warn!(lpn = %lpn, warning = %warning, "Reception warning");
        }
        info!(
            lpn = %lpn,
            product = %item.contents.display_name(),
            quantity = item.quantity(),
            "Pallet received"
        );
        Ok(ReceivePalletResult { item, warnings })
    }
}
