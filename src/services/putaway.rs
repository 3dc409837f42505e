//! Location assignment for scan-driven putaway.
//!
//! The resolver reads the topology and inventory snapshots and either
//! authorizes an assignment, returned as an [`AssignLocationCommand`] for the
//! caller to apply, or explains why the scan was rejected. It never mutates
//! either store.

use tracing::{debug, instrument};

use crate::commands::assign_location_command::AssignLocationCommand;
use crate::errors::AssignmentError;
use crate::location_code::LocationCode;
use crate::lpn::Lpn;
use crate::models::rack::{Rack, SlotKey};
use crate::models::zone::Zone;
use crate::repositories::inventory::InventoryStore;
use crate::repositories::topology::TopologyStore;

/// A location code matched against the configured topology.
#[derive(Debug, Clone)]
pub struct ResolvedSlot<'a> {
    pub code: LocationCode,
    pub zone: &'a Zone,
    pub rack: &'a Rack,
}

impl ResolvedSlot<'_> {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.rack.id, self.code.level(), self.code.position())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PutawayResolver<'a> {
    topology: &'a TopologyStore,
    inventory: &'a InventoryStore,
}

impl<'a> PutawayResolver<'a> {
    pub fn new(topology: &'a TopologyStore, inventory: &'a InventoryStore) -> Self {
        Self {
            topology,
            inventory,
        }
    }

    /// Validates `raw_code` and `lpn` and returns the assignment to apply.
    ///
    /// Checks run in order and the first failure is returned: code shape,
    /// zone code, rack, slot bounds, blocked, occupied, then the LPN.
    #[instrument(skip(self))]
    pub fn resolve(&self, raw_code: &str, lpn: &str) -> Result<AssignLocationCommand, AssignmentError> {
        let outcome = self.locate(raw_code).and_then(|slot| {
            self.check_slot(&slot)?;
            let lpn = self.check_pending(lpn)?;
            Ok(AssignLocationCommand {
                lpn,
                location: slot.rack.location(slot.code.level(), slot.code.position()),
            })
        });

        match &outcome {
            Ok(command) => debug!(lpn = %command.lpn, location = %command.location, "Assignment authorized"),
            Err(err) => debug!(reason = err.code(), "Assignment rejected"),
        }
        outcome
    }

    /// Maps a code to a concrete rack slot without looking at occupancy.
    pub fn locate(&self, raw_code: &str) -> Result<ResolvedSlot<'a>, AssignmentError> {
        let code = LocationCode::parse(raw_code)?;

        let zone = code
            .category()
            .and_then(|category| self.topology.zone_for_category(category))
            .ok_or_else(|| AssignmentError::UnknownZoneCode {
                zone_code: code.zone_code().to_string(),
            })?;

        let rack = self
            .topology
            .find_rack(&zone.id, code.aisle())
            .ok_or_else(|| AssignmentError::RackNotFound {
                zone_code: code.zone_code().to_string(),
                aisle: code.aisle().to_string(),
            })?;

        if !rack.contains(code.level(), code.position()) {
            return Err(AssignmentError::SlotOutOfRange {
                code: code.to_string(),
                rack_id: rack.id,
                levels: rack.levels,
                positions_per_level: rack.positions_per_level,
            });
        }

        Ok(ResolvedSlot { code, zone, rack })
    }

    /// Blocked is reported ahead of occupied.
    pub fn check_slot(&self, slot: &ResolvedSlot<'_>) -> Result<(), AssignmentError> {
        if slot.rack.is_blocked(slot.code.level(), slot.code.position()) {
            return Err(AssignmentError::SlotBlocked {
                code: slot.code.to_string(),
            });
        }
        if let Some(occupant) = self.inventory.occupant(slot.key()) {
            return Err(AssignmentError::SlotOccupied {
                code: slot.code.to_string(),
                occupant: occupant.clone(),
            });
        }
        Ok(())
    }

    /// The LPN must be known and still pending.
    pub fn check_pending(&self, lpn: &str) -> Result<Lpn, AssignmentError> {
        let lpn = Lpn::new(lpn);
        match self.inventory.find(lpn.as_str()) {
            None => Err(AssignmentError::LpnUnknown { lpn }),
            Some(item) => match &item.location {
                Some(location) => Err(AssignmentError::LpnAlreadyAssigned {
                    lpn,
                    location: location.clone(),
                }),
                None => Ok(lpn),
            },
        }
    }
}

/// Convenience wrapper around [`PutawayResolver::resolve`].
pub fn resolve_assignment(
    topology: &TopologyStore,
    inventory: &InventoryStore,
    raw_code: &str,
    lpn: &str,
) -> Result<AssignLocationCommand, AssignmentError> {
    PutawayResolver::new(topology, inventory).resolve(raw_code, lpn)
}
