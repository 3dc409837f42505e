//! Receive, shelve via the scan session, check expirations, then dispatch.

mod common;

use chrono::NaiveDate;
use smartrack_wms::{
    commands::{Command, DispatchCommand},
    models::rack::SlotStatus,
    services::{
        expiration::{self, ExpirationStatus},
        scan_session::{ScanOutcome, ScanSession, ScanStep},
    },
};

use common::TestWarehouse;

#[test]
fn received_pallet_is_shelved_and_dispatched() {
    let TestWarehouse {
        mut warehouse,
        received,
    } = TestWarehouse::new();
    assert_eq!(received, "25112600000151");

    let mut session = ScanSession::new();
    let outcome = session
        .scan_lpn(&warehouse.topology, &warehouse.inventory, received.as_str())
        .unwrap();
    assert_eq!(outcome, ScanOutcome::AwaitingLocation { lpn: received.clone() });

    let command = session
        .scan_location(&warehouse.topology, &warehouse.inventory, "rf-c-3-2")
        .unwrap();
    assert_eq!(session.step(), ScanStep::AwaitingLpn);
    let location = command.execute(&mut warehouse).unwrap();
    assert_eq!(location.to_string(), "C4-2-3");

    let rack = warehouse.topology.rack(4).unwrap();
    assert_eq!(
        warehouse
            .topology
            .slot_status(rack, 2, 3, &warehouse.inventory),
        SlotStatus::Occupied(received.clone())
    );
    let occupancy = warehouse.topology.occupancy(4, &warehouse.inventory).unwrap();
    assert_eq!(occupancy.occupied, 1);
    assert_eq!(occupancy.free, 39);

    let today = NaiveDate::from_ymd_opt(2026, 1, 29).unwrap();
    let flagged = expiration::expiring_items(&warehouse.inventory, today, 5);
    let (item, check) = flagged
        .iter()
        .find(|(item, _)| item.lpn == received)
        .expect("yogurt pallet is flagged");
    assert_eq!(check.status, ExpirationStatus::Warning);
    assert_eq!(check.days_left, 2);
    assert_eq!(item.location.as_ref(), Some(&location));

    let result = DispatchCommand {
        lpns: vec![received.to_string()],
    }
    .execute(&mut warehouse)
    .unwrap();
    assert_eq!(result.dispatched, vec![received]);
    assert_eq!(
        warehouse.topology.occupancy(4, &warehouse.inventory).unwrap().occupied,
        0
    );
}
