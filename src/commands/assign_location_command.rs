use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    commands::Command,
    errors::{AssignmentError, ServiceError, TopologyError},
    lpn::Lpn,
    models::rack::RackLocation,
    warehouse::Warehouse,
};

/// Assignment authorized by the putaway resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignLocationCommand {
    pub lpn: Lpn,
    pub location: RackLocation,
}

impl Command for AssignLocationCommand {
    type Result = RackLocation;

    /// Applies the assignment. The slot is re-checked against the live
    /// stores, so a command resolved from a stale snapshot, or built by
    /// hand, is rejected instead of double-booking or inventing a slot.
    #[instrument(skip(self, warehouse), fields(lpn = %self.lpn, location = %self.location))]
    fn execute(&self, warehouse: &mut Warehouse) -> Result<Self::Result, ServiceError> {
        let location = &self.location;
        let rack = warehouse
            .topology
            .rack(location.rack_id)
            .ok_or(TopologyError::RackNotFound(location.rack_id))?;
        if rack.aisle != location.aisle {
            let zone_code = warehouse
                .topology
                .zone(&rack.zone_id)
                .map(|zone| zone.zone_code())
                .unwrap_or_default();
            return Err(AssignmentError::RackNotFound {
                zone_code: zone_code.to_string(),
                aisle: location.aisle.clone(),
            }
            .into());
        }
        if !rack.contains(location.level, location.position) {
            return Err(AssignmentError::SlotOutOfRange {
                code: location.to_string(),
                rack_id: rack.id,
                levels: rack.levels,
                positions_per_level: rack.positions_per_level,
            }
            .into());
        }
        if rack.is_blocked(location.level, location.position) {
            return Err(AssignmentError::SlotBlocked {
                code: self.location.to_string(),
            }
            .into());
        }

        warehouse
            .inventory
            .apply_assignment(&self.lpn, &self.location)?;
        info!("Location assigned");
        Ok(self.location.clone())
    }
}
