use chrono::{NaiveDate, TimeZone, Utc};
use smartrack_wms::{
    commands::{Command, ReceivePalletCommand},
    seed, Lpn, Warehouse,
};

/// Pending pallet shipped with the demo data.
pub const DEMO_PENDING_LPN: &str = "25112600000026";

/// Pallet shelved at A1-1-1 in the demo data.
pub const DEMO_SHELVED_LPN: &str = "24112600000001";

/// Demo warehouse plus one extra pallet received on 2025-11-26.
pub struct TestWarehouse {
    pub warehouse: Warehouse,
    pub received: Lpn,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let mut warehouse = seed::demo_warehouse();
        let received_at = Utc.with_ymd_and_hms(2025, 11, 26, 8, 0, 0).unwrap();
        let expires = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let result = ReceivePalletCommand::single(
            "7756666666666",
            "Yogurt Fresa 1L",
            40,
            expires,
            "Operador 02",
        )
        .at(received_at)
        .execute(&mut warehouse)
        .expect("demo reception succeeds");

        Self {
            warehouse,
            received: result.item.lpn,
        }
    }
}
