use serde::Deserialize;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::errors::TopologyError;
use crate::location_code::LocationCode;
use crate::models::rack::{Rack, RackOccupancy, SlotKey, SlotStatus};
use crate::models::zone::{Zone, ZoneCategory};
use crate::repositories::inventory::InventoryStore;

const ZONE_ID_PREFIX: &str = "zone-";

/// Input for [`TopologyStore::add_zone`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewZone {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: ZoneCategory,
    pub temperature: Option<String>,
}

/// Input for [`TopologyStore::add_rack`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRack {
    #[validate(length(min = 1))]
    pub zone_id: String,
    #[validate(custom = "validate_aisle")]
    pub aisle: String,
    #[validate(range(min = 1, max = 50))]
    pub levels: u32,
    #[validate(range(min = 1, max = 100))]
    pub positions_per_level: u32,
}

fn validate_aisle(aisle: &str) -> Result<(), ValidationError> {
    let aisle = aisle.trim();
    if aisle.is_empty() || !aisle.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("aisle");
        err.message = Some("Aisle must be a non-empty alphanumeric label".into());
        return Err(err);
    }
    Ok(())
}

/// Configured zones and racks.
///
/// Lookups return the first match in configuration order.
#[derive(Debug, Default, Clone)]
pub struct TopologyStore {
    zones: Vec<Zone>,
    racks: Vec<Rack>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(zones: Vec<Zone>, racks: Vec<Rack>) -> Self {
        Self { zones, racks }
    }

    pub fn into_parts(self) -> (Vec<Zone>, Vec<Rack>) {
        (self.zones, self.racks)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn racks(&self) -> &[Rack] {
        &self.racks
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    pub fn rack(&self, rack_id: u32) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == rack_id)
    }

    pub fn racks_in_zone<'a>(&'a self, zone_id: &'a str) -> impl Iterator<Item = &'a Rack> + 'a {
        self.racks.iter().filter(move |r| r.zone_id == zone_id)
    }

    /// First zone configured with `category`.
    pub fn zone_for_category(&self, category: ZoneCategory) -> Option<&Zone> {
        self.zones.iter().find(|z| z.category == category)
    }

    /// First rack in `zone_id` whose aisle label equals `aisle`.
    pub fn find_rack(&self, zone_id: &str, aisle: &str) -> Option<&Rack> {
        self.racks
            .iter()
            .find(|r| r.zone_id == zone_id && r.aisle == aisle)
    }

    fn next_zone_id(&self) -> String {
        let next = self
            .zones
            .iter()
            .filter_map(|z| z.id.strip_prefix(ZONE_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        format!("{ZONE_ID_PREFIX}{next}")
    }

    fn next_rack_id(&self) -> u32 {
        self.racks.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    #[instrument(skip(self))]
    pub fn add_zone(&mut self, new_zone: NewZone) -> Result<&Zone, TopologyError> {
        new_zone.validate()?;

        let zone = Zone {
            id: self.next_zone_id(),
            name: new_zone.name.trim().to_string(),
            category: new_zone.category,
            temperature: new_zone.temperature.filter(|t| !t.trim().is_empty()),
        };
        if self.zone_for_category(zone.category).is_some() {
            warn!(
                category = %zone.category,
                "Another zone already uses this category; location codes resolve to the first one"
            );
        }
        info!(zone_id = %zone.id, name = %zone.name, "Zone created");
        self.zones.push(zone);
        let last = self.zones.len() - 1;
        Ok(&self.zones[last])
    }

    /// Deletes a zone together with its racks. Refused while any of those
    /// racks still holds inventory.
    #[instrument(skip(self, inventory))]
    pub fn delete_zone(
        &mut self,
        zone_id: &str,
        inventory: &InventoryStore,
    ) -> Result<Zone, TopologyError> {
        let index = self
            .zones
            .iter()
            .position(|z| z.id == zone_id)
            .ok_or_else(|| TopologyError::ZoneNotFound(zone_id.to_string()))?;

        for rack in self.racks_in_zone(zone_id) {
            let occupied = inventory.occupied_on_rack(rack.id);
            if occupied > 0 {
                return Err(TopologyError::RackInUse {
                    rack_id: rack.id,
                    occupied,
                });
            }
        }

        let before = self.racks.len();
        self.racks.retain(|r| r.zone_id != zone_id);
        let zone = self.zones.remove(index);
        info!(
            zone_id = %zone.id,
            racks_removed = before - self.racks.len(),
            "Zone deleted"
        );
        Ok(zone)
    }

    #[instrument(skip(self))]
    pub fn add_rack(&mut self, new_rack: NewRack) -> Result<&Rack, TopologyError> {
        new_rack.validate()?;
        if self.zone(&new_rack.zone_id).is_none() {
            return Err(TopologyError::ZoneNotFound(new_rack.zone_id));
        }

        let rack = Rack::new(
            self.next_rack_id(),
            new_rack.zone_id,
            &new_rack.aisle,
            new_rack.levels,
            new_rack.positions_per_level,
        );
        // A zone's aisle maps to one rack. Loaded layouts may still hold
        // duplicates; lookups return the first.
        if let Some(existing) = self.find_rack(&rack.zone_id, &rack.aisle) {
            return Err(TopologyError::DuplicateAisle {
                zone_id: rack.zone_id,
                aisle: rack.aisle,
                existing: existing.id,
            });
        }
        info!(rack_id = rack.id, aisle = %rack.aisle, slots = rack.slots.len(), "Rack created");
        self.racks.push(rack);
        let last = self.racks.len() - 1;
        Ok(&self.racks[last])
    }

    #[instrument(skip(self, inventory))]
    pub fn delete_rack(
        &mut self,
        rack_id: u32,
        inventory: &InventoryStore,
    ) -> Result<Rack, TopologyError> {
        let index = self
            .racks
            .iter()
            .position(|r| r.id == rack_id)
            .ok_or(TopologyError::RackNotFound(rack_id))?;
        let occupied = inventory.occupied_on_rack(rack_id);
        if occupied > 0 {
            return Err(TopologyError::RackInUse { rack_id, occupied });
        }
        let rack = self.racks.remove(index);
        info!(rack_id, "Rack deleted");
        Ok(rack)
    }

    /// Flips the blocked flag of a slot and returns the new value. An
    /// occupied slot cannot be blocked.
    #[instrument(skip(self, inventory))]
    pub fn toggle_slot_block(
        &mut self,
        rack_id: u32,
        level: u32,
        position: u32,
        inventory: &InventoryStore,
    ) -> Result<bool, TopologyError> {
        let rack = self
            .racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or(TopologyError::RackNotFound(rack_id))?;
        let slot = rack
            .slot_mut(level, position)
            .ok_or(TopologyError::SlotNotFound {
                rack_id,
                level,
                position,
            })?;

        if !slot.blocked {
            if let Some(occupant) = inventory.occupant(SlotKey::new(rack_id, level, position)) {
                return Err(TopologyError::SlotOccupied {
                    rack_id,
                    level,
                    position,
                    occupant: occupant.clone(),
                });
            }
        }

        slot.blocked = !slot.blocked;
        info!(blocked = slot.blocked, "Slot block toggled");
        Ok(slot.blocked)
    }

    /// Status of one slot; blocked wins over occupied.
    pub fn slot_status(
        &self,
        rack: &Rack,
        level: u32,
        position: u32,
        inventory: &InventoryStore,
    ) -> SlotStatus {
        if rack.is_blocked(level, position) {
            return SlotStatus::Blocked;
        }
        match inventory.occupant(SlotKey::new(rack.id, level, position)) {
            Some(lpn) => SlotStatus::Occupied(lpn.clone()),
            None => SlotStatus::Empty,
        }
    }

    /// Canonical code to print on the label of a slot.
    pub fn label_for_slot(
        &self,
        rack_id: u32,
        level: u32,
        position: u32,
    ) -> Result<LocationCode, TopologyError> {
        let rack = self
            .rack(rack_id)
            .ok_or(TopologyError::RackNotFound(rack_id))?;
        if !rack.contains(level, position) {
            return Err(TopologyError::SlotNotFound {
                rack_id,
                level,
                position,
            });
        }
        let zone = self
            .zone(&rack.zone_id)
            .ok_or_else(|| TopologyError::ZoneNotFound(rack.zone_id.clone()))?;
        Ok(LocationCode::for_slot(
            zone.category,
            &rack.aisle,
            level,
            position,
        ))
    }

    pub fn occupancy(
        &self,
        rack_id: u32,
        inventory: &InventoryStore,
    ) -> Result<RackOccupancy, TopologyError> {
        let rack = self
            .rack(rack_id)
            .ok_or(TopologyError::RackNotFound(rack_id))?;
        let mut summary = RackOccupancy {
            total: rack.capacity(),
            ..Default::default()
        };
        for slot in &rack.slots {
            match self.slot_status(rack, slot.level, slot.position, inventory) {
                SlotStatus::Blocked => summary.blocked += 1,
                SlotStatus::Occupied(_) => summary.occupied += 1,
                SlotStatus::Empty => summary.free += 1,
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lpn::Lpn;
    use crate::models::inventory_item::{InventoryItem, PalletContents};
    use crate::models::rack::RackLocation;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Utc};

    fn topology() -> TopologyStore {
        let mut store = TopologyStore::new();
        store
            .add_zone(NewZone {
                name: "Cámara Seca A".into(),
                category: ZoneCategory::Dry,
                temperature: None,
            })
            .unwrap();
        store
            .add_rack(NewRack {
                zone_id: "zone-1".into(),
                aisle: "a".into(),
                levels: 6,
                positions_per_level: 9,
            })
            .unwrap();
        store
    }

    fn racked_at(level: u32, position: u32) -> InventoryStore {
        InventoryStore::from_items(vec![InventoryItem {
            lpn: Lpn::new("24112600000001"),
            contents: PalletContents::Single {
                product_code: "7751234567890".into(),
                product_name: "Arroz".into(),
                quantity: 50,
            },
            expiration_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            reception_date: Utc::now(),
            received_by: "Operador 01".into(),
            photos: Vec::new(),
            location: Some(RackLocation {
                aisle: "A".into(),
                rack_id: 1,
                level,
                position,
            }),
        }])
        .unwrap()
    }

    #[test]
    fn add_rack_assigns_ids_and_uppercases_aisle() {
        let mut store = topology();
        let rack = store.rack(1).unwrap();
        assert_eq!(rack.aisle, "A");
        assert_eq!(rack.slots.len(), 54);

        let second = store
            .add_rack(NewRack {
                zone_id: "zone-1".into(),
                aisle: "B".into(),
                levels: 2,
                positions_per_level: 3,
            })
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn add_rack_validates_input() {
        let mut store = topology();
        let bad_levels = NewRack {
            zone_id: "zone-1".into(),
            aisle: "B".into(),
            levels: 0,
            positions_per_level: 3,
        };
        assert_matches!(store.add_rack(bad_levels), Err(TopologyError::Validation(_)));

        let bad_aisle = NewRack {
            zone_id: "zone-1".into(),
            aisle: "B-2".into(),
            levels: 1,
            positions_per_level: 1,
        };
        assert_matches!(store.add_rack(bad_aisle), Err(TopologyError::Validation(_)));

        let unknown_zone = NewRack {
            zone_id: "zone-9".into(),
            aisle: "B".into(),
            levels: 1,
            positions_per_level: 1,
        };
        assert_matches!(
            store.add_rack(unknown_zone),
            Err(TopologyError::ZoneNotFound(_))
        );
    }

    #[test]
    fn duplicate_aisle_in_zone_is_rejected() {
        let mut store = topology();
        let err = store
            .add_rack(NewRack {
                zone_id: "zone-1".into(),
                aisle: " a ".into(),
                levels: 2,
                positions_per_level: 2,
            })
            .unwrap_err();
        assert_matches!(
            err,
            TopologyError::DuplicateAisle { ref aisle, existing: 1, .. } if aisle == "A"
        );
        assert_eq!(store.racks().len(), 1);
    }

    #[test]
    fn zone_ids_are_sequential() {
        let mut store = topology();
        let zone = store
            .add_zone(NewZone {
                name: "Cámara Refrigerada".into(),
                category: ZoneCategory::Cold,
                temperature: Some("2-8 °C".into()),
            })
            .unwrap();
        assert_eq!(zone.id, "zone-2");
    }

    #[test]
    fn delete_zone_cascades_to_racks() {
        let mut store = topology();
        store.delete_zone("zone-1", &InventoryStore::new()).unwrap();
        assert!(store.zones().is_empty());
        assert!(store.racks().is_empty());
    }

    #[test]
    fn delete_refused_while_stock_is_racked() {
        let mut store = topology();
        let inventory = racked_at(1, 1);
        assert_matches!(
            store.delete_rack(1, &inventory),
            Err(TopologyError::RackInUse { occupied: 1, .. })
        );
        assert_matches!(
            store.delete_zone("zone-1", &inventory),
            Err(TopologyError::RackInUse { .. })
        );
    }

    #[test]
    fn toggle_block_and_status() {
        let mut store = topology();
        let inventory = racked_at(1, 1);

        assert!(store.toggle_slot_block(1, 2, 2, &inventory).unwrap());
        let rack = store.rack(1).unwrap().clone();
        assert_eq!(store.slot_status(&rack, 2, 2, &inventory), SlotStatus::Blocked);
        assert_eq!(
            store.slot_status(&rack, 1, 1, &inventory),
            SlotStatus::Occupied(Lpn::new("24112600000001"))
        );
        assert_eq!(store.slot_status(&rack, 3, 3, &inventory), SlotStatus::Empty);

        assert!(!store.toggle_slot_block(1, 2, 2, &inventory).unwrap());
        assert_matches!(
            store.toggle_slot_block(1, 1, 1, &inventory),
            Err(TopologyError::SlotOccupied { .. })
        );
        assert_matches!(
            store.toggle_slot_block(1, 7, 1, &inventory),
            Err(TopologyError::SlotNotFound { .. })
        );
    }

    #[test]
    fn labels_and_occupancy() {
        let mut store = topology();
        let inventory = racked_at(1, 1);
        store.toggle_slot_block(1, 6, 9, &inventory).unwrap();

        assert_eq!(store.label_for_slot(1, 5, 1).unwrap().to_string(), "SE-A-1-5");
        assert_matches!(
            store.label_for_slot(1, 0, 1),
            Err(TopologyError::SlotNotFound { .. })
        );

        let summary = store.occupancy(1, &inventory).unwrap();
        assert_eq!(summary.total, 54);
        assert_eq!(summary.occupied, 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.free, 52);
    }
}
