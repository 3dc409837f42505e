use chrono::NaiveDate;
use serde::Serialize;
use strum::Display;

use crate::models::inventory_item::InventoryItem;
use crate::repositories::inventory::InventoryStore;

/// Days before expiration at which stock is flagged for withdrawal.
pub const DEFAULT_WARNING_DAYS: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpirationStatus {
    Expired,
    Warning,
    Ok,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExpirationCheck {
    pub status: ExpirationStatus,
    /// Calendar days until expiration; negative once expired.
    pub days_left: i64,
}

impl ExpirationCheck {
    pub fn evaluate(expiration: NaiveDate, today: NaiveDate, warning_days: i64) -> Self {
        let days_left = (expiration - today).num_days();
        let status = if days_left < 0 {
            ExpirationStatus::Expired
        } else if days_left <= warning_days {
            ExpirationStatus::Warning
        } else {
            ExpirationStatus::Ok
        };
        Self { status, days_left }
    }

    pub fn needs_attention(&self) -> bool {
        self.status != ExpirationStatus::Ok
    }
}

/// Expired and soon-to-expire items, earliest expiration first.
pub fn expiring_items(
    inventory: &InventoryStore,
    today: NaiveDate,
    warning_days: i64,
) -> Vec<(&InventoryItem, ExpirationCheck)> {
    let mut flagged: Vec<_> = inventory
        .items()
        .iter()
        .map(|item| {
            (
                item,
                ExpirationCheck::evaluate(item.expiration_date, today, warning_days),
            )
        })
        .filter(|(_, check)| check.needs_attention())
        .collect();
    flagged.sort_by(|(a, ca), (b, cb)| ca.days_left.cmp(&cb.days_left).then_with(|| a.lpn.cmp(&b.lpn)));
    flagged
}

/// Item counts per status.
pub fn status_counts(
    inventory: &InventoryStore,
    today: NaiveDate,
    warning_days: i64,
) -> (usize, usize, usize) {
    inventory.items().iter().fold((0, 0, 0), |(expired, warning, ok), item| {
        match ExpirationCheck::evaluate(item.expiration_date, today, warning_days).status {
            ExpirationStatus::Expired => (expired + 1, warning, ok),
            ExpirationStatus::Warning => (expired, warning + 1, ok),
            ExpirationStatus::Ok => (expired, warning, ok + 1),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn thresholds() {
        let today = d(2025, 11, 26);
        let check = |exp| ExpirationCheck::evaluate(exp, today, DEFAULT_WARNING_DAYS);

        assert_eq!(check(d(2025, 11, 25)).status, ExpirationStatus::Expired);
        assert_eq!(check(d(2025, 11, 25)).days_left, -1);
        assert_eq!(check(d(2025, 11, 26)).status, ExpirationStatus::Warning);
        assert_eq!(check(d(2025, 12, 1)).status, ExpirationStatus::Warning);
        assert_eq!(check(d(2025, 12, 2)).status, ExpirationStatus::Ok);
        assert_eq!(check(d(2025, 12, 2)).days_left, 6);
    }

    #[test]
    fn counts_cover_every_item() {
        let inventory = crate::seed::demo_warehouse().inventory;

        assert_eq!(status_counts(&inventory, d(2025, 11, 26), DEFAULT_WARNING_DAYS), (0, 2, 1));
        assert_eq!(status_counts(&inventory, d(2025, 12, 2), DEFAULT_WARNING_DAYS), (2, 0, 1));
        assert_eq!(status_counts(&InventoryStore::new(), d(2025, 12, 2), DEFAULT_WARNING_DAYS), (0, 0, 0));
    }

    #[test]
    fn status_renders_uppercase() {
        assert_eq!(ExpirationStatus::Expired.to_string(), "EXPIRED");
        assert_eq!(ExpirationStatus::Ok.to_string(), "OK");
    }
}
