//! Scan-to-slot resolution against the demo warehouse.

mod common;

use assert_matches::assert_matches;
use rstest::rstest;
use smartrack_wms::{
    commands::Command, resolve_assignment, seed, AssignmentError, ServiceError, Warehouse,
};

use common::{TestWarehouse, DEMO_PENDING_LPN, DEMO_SHELVED_LPN};

fn demo() -> Warehouse {
    seed::demo_warehouse()
}

#[rstest]
#[case("SE-A-1-5")]
#[case("se-a-1-5")]
#[case("  SE-A-1-5\n")]
#[case("Se-a-01-05")]
fn resolves_dry_aisle_a_to_rack_one(#[case] code: &str) {
    let warehouse = demo();
    let command = resolve_assignment(
        &warehouse.topology,
        &warehouse.inventory,
        code,
        DEMO_PENDING_LPN,
    )
    .unwrap();

    assert_eq!(command.lpn, DEMO_PENDING_LPN);
    assert_eq!(command.location.rack_id, 1);
    assert_eq!(command.location.aisle, "A");
    assert_eq!(command.location.level, 5);
    assert_eq!(command.location.position, 1);
    assert_eq!(command.location.to_string(), "A1-5-1");
}

#[rstest]
#[case("SE-A-1")]
#[case("SEA15")]
#[case("")]
#[case("SE-A-X-5")]
#[case("SE-A-0-5")]
#[case("SE-A-1-0")]
#[case("S-A-1-5")]
#[case("SE--1-5")]
fn rejects_malformed_codes(#[case] code: &str) {
    let warehouse = demo();
    let err = warehouse.resolver().resolve(code, DEMO_PENDING_LPN).unwrap_err();
    assert_matches!(err, AssignmentError::MalformedLocationCode { .. });
}

#[test]
fn unknown_zone_code() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("XX-A-1-5", DEMO_PENDING_LPN).unwrap_err();
    assert_eq!(
        err,
        AssignmentError::UnknownZoneCode {
            zone_code: "XX".into()
        }
    );
}

#[test]
fn known_code_without_configured_zone_is_unknown() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("CG-A-1-1", DEMO_PENDING_LPN).unwrap_err();
    assert_matches!(err, AssignmentError::UnknownZoneCode { ref zone_code } if zone_code == "CG");
}

#[test]
fn aisle_outside_zone_is_rack_not_found() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("RF-A-1-5", DEMO_PENDING_LPN).unwrap_err();
    assert_eq!(
        err,
        AssignmentError::RackNotFound {
            zone_code: "RF".into(),
            aisle: "A".into()
        }
    );
    assert!(err.is_location_error());
}

#[rstest]
#[case("SE-A-10-1")]
#[case("SE-A-1-7")]
#[case("RF-C-9-1")]
fn out_of_bounds_slot(#[case] code: &str) {
    let warehouse = demo();
    let err = warehouse.resolver().resolve(code, DEMO_PENDING_LPN).unwrap_err();
    assert_matches!(err, AssignmentError::SlotOutOfRange { .. });
}

#[test]
fn occupied_slot_names_occupant() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("SE-A-1-1", DEMO_PENDING_LPN).unwrap_err();
    assert_matches!(
        err,
        AssignmentError::SlotOccupied { ref code, ref occupant }
            if code == "SE-A-1-1" && occupant == DEMO_SHELVED_LPN
    );
}

#[test]
fn blocked_slot_wins_over_occupied() {
    let mut warehouse = demo();
    let Warehouse {
        topology,
        inventory,
        ..
    } = &mut warehouse;
    topology.toggle_slot_block(1, 5, 1, inventory).unwrap();

    let err = warehouse.resolver().resolve("SE-A-1-5", DEMO_PENDING_LPN).unwrap_err();
    assert_eq!(
        err,
        AssignmentError::SlotBlocked {
            code: "SE-A-1-5".into()
        }
    );
}

#[test]
fn unknown_lpn() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("SE-A-1-5", "99999999999999").unwrap_err();
    assert_matches!(err, AssignmentError::LpnUnknown { ref lpn } if lpn == "99999999999999");
}

#[test]
fn lpn_already_on_a_rack() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("SE-A-1-5", DEMO_SHELVED_LPN).unwrap_err();
    assert_matches!(
        err,
        AssignmentError::LpnAlreadyAssigned { ref location, .. } if location.to_string() == "A1-1-1"
    );
}

#[test]
fn location_errors_are_reported_before_lpn_errors() {
    let warehouse = demo();
    let err = warehouse.resolver().resolve("XX-A-1-5", "99999999999999").unwrap_err();
    assert_matches!(err, AssignmentError::UnknownZoneCode { .. });
}

#[test]
fn second_assignment_from_stale_snapshot_is_rejected() {
    let TestWarehouse {
        mut warehouse,
        received,
    } = TestWarehouse::new();

    let first = warehouse.resolver().resolve("SE-A-2-3", DEMO_PENDING_LPN).unwrap();
    let second = warehouse.resolver().resolve("SE-A-2-3", received.as_str()).unwrap();

    first.execute(&mut warehouse).unwrap();
    let err = second.execute(&mut warehouse).unwrap_err();
    assert_matches!(
        err.as_assignment(),
        Some(AssignmentError::SlotOccupied { occupant, .. }) if occupant == DEMO_PENDING_LPN
    );
    assert!(warehouse.inventory.find(received.as_str()).unwrap().is_pending());
}

#[test]
fn assignment_error_surfaces_through_service_error() {
    let mut warehouse = demo();
    let command = warehouse.resolver().resolve("SE-A-1-5", DEMO_PENDING_LPN).unwrap();
    command.execute(&mut warehouse).unwrap();

    let err = command.execute(&mut warehouse).unwrap_err();
    assert_matches!(err, ServiceError::Inventory(_));
    assert!(err.as_assignment().is_some());
}
