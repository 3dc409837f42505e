//! Reception checks applied before a pallet enters the pending set.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use validator::Validate;

use crate::errors::InventoryError;
use crate::models::inventory_item::PalletContents;
use crate::repositories::inventory::InventoryStore;
use crate::services::expiration::{ExpirationCheck, ExpirationStatus};

/// Non-blocking observations surfaced to the receiving operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceptionWarning {
    /// Stock is expired or inside the withdrawal window. Reception proceeds.
    ExpiresSoon {
        product_code: String,
        days_left: i64,
    },
    /// Incoming stock expires before stock already held (FEFO inversion).
    OlderThanStock {
        product_code: String,
        received: NaiveDate,
        latest_in_stock: NaiveDate,
    },
}

impl fmt::Display for ReceptionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceptionWarning::ExpiresSoon {
                product_code,
                days_left,
            } if *days_left < 0 => write!(f, "{product_code} is already expired"),
            ReceptionWarning::ExpiresSoon {
                product_code,
                days_left,
            } => write!(f, "{product_code} expires in {days_left} day(s) and must be withdrawn soon"),
            ReceptionWarning::OlderThanStock {
                product_code,
                received,
                latest_in_stock,
            } => write!(
                f,
                "{product_code} expires {received}, earlier than stock already held ({latest_in_stock})"
            ),
        }
    }
}

/// Checks quantities and line counts.
pub fn validate_contents(contents: &PalletContents) -> Result<(), InventoryError> {
    match contents {
        PalletContents::Single {
            product_code,
            quantity,
            ..
        } => {
            if product_code.trim().is_empty() {
                return Err(InventoryError::Validation("product code is required".into()));
            }
            if *quantity == 0 {
                return Err(InventoryError::Validation("quantity must be positive".into()));
            }
        }
        PalletContents::Mixed { items } => {
            if items.is_empty() {
                return Err(InventoryError::EmptyMixedPallet);
            }
            for line in items {
                line.validate()?;
            }
        }
    }
    Ok(())
}

/// Expiration recorded on the pallet: the critical line date for mixed
/// pallets, otherwise the date supplied at reception.
pub fn pallet_expiration(
    contents: &PalletContents,
    supplied: Option<NaiveDate>,
) -> Result<NaiveDate, InventoryError> {
    contents
        .critical_expiration()
        .or(supplied)
        .ok_or_else(|| InventoryError::Validation("expiration date is required".into()))
}

/// Warnings for receiving `contents` against the current stock.
pub fn reception_warnings(
    inventory: &InventoryStore,
    contents: &PalletContents,
    expiration: NaiveDate,
    today: NaiveDate,
    warning_days: i64,
) -> Vec<ReceptionWarning> {
    let lines: Vec<(&str, NaiveDate)> = match contents {
        PalletContents::Single { product_code, .. } => vec![(product_code.as_str(), expiration)],
        PalletContents::Mixed { items } => items
            .iter()
            .map(|i| (i.product_code.as_str(), i.expiration_date))
            .collect(),
    };

    let mut warnings = Vec::new();
    for (product_code, date) in lines {
        let check = ExpirationCheck::evaluate(date, today, warning_days);
        if check.status != ExpirationStatus::Ok {
            warnings.push(ReceptionWarning::ExpiresSoon {
                product_code: product_code.to_string(),
                days_left: check.days_left,
            });
        }
        if let Some(latest) = inventory.latest_expiration_for(product_code) {
            if date < latest {
                warnings.push(ReceptionWarning::OlderThanStock {
                    product_code: product_code.to_string(),
                    received: date,
                    latest_in_stock: latest,
                });
            }
        }
    }
    warnings
}
