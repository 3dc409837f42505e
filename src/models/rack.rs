use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lpn::Lpn;

/// One addressable (level, position) cell inside a rack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub level: u32,
    pub position: u32,
    /// Maintenance / unusable flag. Blocked slots never receive assignments.
    #[serde(default)]
    pub blocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub id: u32,
    pub zone_id: String,
    pub aisle: String,
    pub levels: u32,
    pub positions_per_level: u32,
    pub slots: Vec<Slot>,
}

impl Rack {
    /// Creates a rack with one unblocked slot per (level, position).
    pub fn new(
        id: u32,
        zone_id: impl Into<String>,
        aisle: impl AsRef<str>,
        levels: u32,
        positions_per_level: u32,
    ) -> Self {
        let slots = (1..=levels)
            .flat_map(|level| {
                (1..=positions_per_level).map(move |position| Slot {
                    level,
                    position,
                    blocked: false,
                })
            })
            .collect();

        Self {
            id,
            zone_id: zone_id.into(),
            aisle: aisle.as_ref().trim().to_ascii_uppercase(),
            levels,
            positions_per_level,
            slots,
        }
    }

    pub fn capacity(&self) -> usize {
        self.levels as usize * self.positions_per_level as usize
    }

    pub fn contains(&self, level: u32, position: u32) -> bool {
        (1..=self.levels).contains(&level) && (1..=self.positions_per_level).contains(&position)
    }

    pub fn slot(&self, level: u32, position: u32) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|s| s.level == level && s.position == position)
    }

    pub fn slot_mut(&mut self, level: u32, position: u32) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|s| s.level == level && s.position == position)
    }

    /// Missing slot records count as unblocked.
    pub fn is_blocked(&self, level: u32, position: u32) -> bool {
        self.slot(level, position).map_or(false, |s| s.blocked)
    }

    pub fn location(&self, level: u32, position: u32) -> RackLocation {
        RackLocation {
            aisle: self.aisle.clone(),
            rack_id: self.id,
            level,
            position,
        }
    }
}

/// Physical address of an assigned item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RackLocation {
    pub aisle: String,
    pub rack_id: u32,
    pub level: u32,
    pub position: u32,
}

impl RackLocation {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            rack_id: self.rack_id,
            level: self.level,
            position: self.position,
        }
    }
}

/// Rendered the way operators read it off the rack: `A1-5-1`.
impl fmt::Display for RackLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}-{}",
            self.aisle, self.rack_id, self.level, self.position
        )
    }
}

/// Occupancy index key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub rack_id: u32,
    pub level: u32,
    pub position: u32,
}

impl SlotKey {
    pub fn new(rack_id: u32, level: u32, position: u32) -> Self {
        Self {
            rack_id,
            level,
            position,
        }
    }
}

/// Derived state of a slot. Blocked takes precedence over occupied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "lpn", rename_all = "snake_case")]
pub enum SlotStatus {
    Empty,
    Occupied(Lpn),
    Blocked,
}

/// Per-rack counters for configuration screens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RackOccupancy {
    pub total: usize,
    pub occupied: usize,
    pub blocked: usize,
    pub free: usize,
}
