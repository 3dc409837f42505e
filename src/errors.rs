use serde::Serialize;
use thiserror::Error;

use crate::lpn::Lpn;
use crate::models::rack::RackLocation;

/// Rejections produced while resolving a scanned location for an LPN.
///
/// None of these are fatal: the operator corrects the scan and resubmits.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentError {
    #[error("Invalid location code '{code}'. Use ZONE-AISLE-POSITION-LEVEL (e.g. SE-A-1-5)")]
    MalformedLocationCode { code: String },

    #[error("Zone code '{zone_code}' is not recognised")]
    UnknownZoneCode { zone_code: String },

    #[error("No rack found in aisle {aisle} / zone {zone_code}")]
    RackNotFound { zone_code: String, aisle: String },

    #[error("Location {code} is outside rack {rack_id} ({levels} levels x {positions_per_level} positions)")]
    SlotOutOfRange {
        code: String,
        rack_id: u32,
        levels: u32,
        positions_per_level: u32,
    },

    #[error("Location {code} is blocked")]
    SlotBlocked { code: String },

    #[error("Location {code} is already occupied by {occupant}")]
    SlotOccupied { code: String, occupant: Lpn },

    #[error("LPN {lpn} not found among pending receptions")]
    LpnUnknown { lpn: Lpn },

    #[error("LPN {lpn} is already located at {location}")]
    LpnAlreadyAssigned { lpn: Lpn, location: RackLocation },
}

impl AssignmentError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedLocationCode { .. } => "malformed_location_code",
            Self::UnknownZoneCode { .. } => "unknown_zone_code",
            Self::RackNotFound { .. } => "rack_not_found",
            Self::SlotOutOfRange { .. } => "slot_out_of_range",
            Self::SlotBlocked { .. } => "slot_blocked",
            Self::SlotOccupied { .. } => "slot_occupied",
            Self::LpnUnknown { .. } => "lpn_unknown",
            Self::LpnAlreadyAssigned { .. } => "lpn_already_assigned",
        }
    }

    /// True when the location part of the scan was at fault.
    pub fn is_location_error(&self) -> bool {
        !matches!(
            self,
            Self::LpnUnknown { .. } | Self::LpnAlreadyAssigned { .. }
        )
    }
}

/// Zone and rack configuration failures.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Rack not found: {0}")]
    RackNotFound(u32),

    #[error("Slot {level}-{position} does not exist on rack {rack_id}")]
    SlotNotFound {
        rack_id: u32,
        level: u32,
        position: u32,
    },

    #[error("Rack {rack_id} still holds {occupied} pallet(s)")]
    RackInUse { rack_id: u32, occupied: usize },

    #[error("Slot {level}-{position} on rack {rack_id} is occupied by {occupant}")]
    SlotOccupied {
        rack_id: u32,
        level: u32,
        position: u32,
        occupant: Lpn,
    },

    #[error("Aisle {aisle} already has rack {existing} in zone {zone_id}")]
    DuplicateAisle {
        zone_id: String,
        aisle: String,
        existing: u32,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for TopologyError {
    fn from(err: validator::ValidationErrors) -> Self {
        TopologyError::Validation(err.to_string())
    }
}

/// Inventory store failures.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("LPN {0} is already registered")]
    DuplicateLpn(Lpn),

    #[error("LPN not found: {0}")]
    LpnNotFound(String),

    #[error("Mixed pallet has no lines")]
    EmptyMixedPallet,

    #[error("{lpn} already has the maximum of {max} photos")]
    PhotoLimitReached { lpn: Lpn, max: usize },

    #[error("Photo index {index} out of range for {lpn}")]
    PhotoIndexOutOfRange { lpn: Lpn, index: usize },

    #[error("Location {location} is referenced by both {first} and {second}")]
    DuplicateLocation {
        location: RackLocation,
        first: Lpn,
        second: Lpn,
    },

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for InventoryError {
    fn from(err: validator::ValidationErrors) -> Self {
        InventoryError::Validation(err.to_string())
    }
}

/// Snapshot storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot slot '{slot}' is corrupt: {reason}")]
    Corrupt { slot: String, reason: String },
}

/// Umbrella error for commands and the CLI.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    ValidationError(String),

}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Resolver rejection carried by this error, if any.
    pub fn as_assignment(&self) -> Option<&AssignmentError> {
        match self {
            ServiceError::Assignment(err) => Some(err),
            ServiceError::Inventory(InventoryError::Assignment(err)) => Some(err),
            _ => None,
        }
    }
}
