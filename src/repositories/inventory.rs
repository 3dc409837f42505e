use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::errors::{AssignmentError, InventoryError};
use crate::lpn::Lpn;
use crate::models::inventory_item::{InventoryItem, PalletContents};
use crate::models::rack::{RackLocation, SlotKey};

/// Photo references kept per item.
pub const MAX_PHOTOS: usize = 5;

/// Active inventory, in reception order.
///
/// Occupancy is indexed by `(rack_id, level, position)` and maintained on
/// every assignment and removal, so slot checks never rescan the items.
#[derive(Debug, Default, Clone)]
pub struct InventoryStore {
    items: Vec<InventoryItem>,
    occupancy: HashMap<SlotKey, Lpn>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot, rejecting duplicate LPNs and
    /// doubly-booked slots.
    pub fn from_items(items: Vec<InventoryItem>) -> Result<Self, InventoryError> {
        let mut store = Self::new();
        for item in items {
            store.insert(item)?;
        }
        Ok(store)
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, lpn: &str) -> Option<&InventoryItem> {
        let lpn = lpn.trim();
        self.items.iter().find(|i| i.lpn == lpn)
    }

    fn find_mut(&mut self, lpn: &str) -> Option<&mut InventoryItem> {
        let lpn = lpn.trim();
        self.items.iter_mut().find(|i| i.lpn == lpn)
    }

    /// Items awaiting shelving.
    pub fn pending(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter().filter(|i| i.is_pending())
    }

    /// Items with a rack location.
    pub fn racked(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter().filter(|i| !i.is_pending())
    }

    pub fn occupant(&self, key: SlotKey) -> Option<&Lpn> {
        self.occupancy.get(&key)
    }

    pub fn is_occupied(&self, key: SlotKey) -> bool {
        self.occupancy.contains_key(&key)
    }

    /// Number of occupied slots on `rack_id`.
    pub fn occupied_on_rack(&self, rack_id: u32) -> usize {
        self.occupancy
            .keys()
            .filter(|k| k.rack_id == rack_id)
            .count()
    }

    /// Adds an item. Items normally arrive pending; located items are
    /// accepted when restoring snapshots as long as their slot is free.
    #[instrument(skip(self, item), fields(lpn = %item.lpn))]
    pub fn insert(&mut self, item: InventoryItem) -> Result<(), InventoryError> {
        if self.find(item.lpn.as_str()).is_some() {
            return Err(InventoryError::DuplicateLpn(item.lpn));
        }
        if let Some(location) = &item.location {
            if let Some(first) = self.occupancy.get(&location.key()) {
                return Err(InventoryError::DuplicateLocation {
                    location: location.clone(),
                    first: first.clone(),
                    second: item.lpn,
                });
            }
            self.occupancy.insert(location.key(), item.lpn.clone());
        }
        self.items.push(item);
        Ok(())
    }

    /// Records a resolved assignment.
    ///
    /// Pending state and slot occupancy are checked again under the exclusive
    /// borrow, so two assignments resolved against the same snapshot cannot
    /// both land on one slot.
    #[instrument(skip(self, location), fields(location = %location))]
    pub fn apply_assignment(
        &mut self,
        lpn: &Lpn,
        location: &RackLocation,
    ) -> Result<(), InventoryError> {
        let key = location.key();
        if let Some(occupant) = self.occupancy.get(&key) {
            return Err(AssignmentError::SlotOccupied {
                code: location.to_string(),
                occupant: occupant.clone(),
            }
            .into());
        }

        let item = self
            .find_mut(lpn.as_str())
            .ok_or_else(|| AssignmentError::LpnUnknown { lpn: lpn.clone() })?;
        if let Some(existing) = &item.location {
            return Err(AssignmentError::LpnAlreadyAssigned {
                lpn: lpn.clone(),
                location: existing.clone(),
            }
            .into());
        }

        item.location = Some(location.clone());
        self.occupancy.insert(key, lpn.clone());
        info!(lpn = %lpn, "Pallet shelved");
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> InventoryItem {
        let item = self.items.remove(index);
        if let Some(location) = &item.location {
            self.occupancy.remove(&location.key());
        }
        item
    }

    /// Removes an item from the active set.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, lpn: &str) -> Result<InventoryItem, InventoryError> {
        let lpn = lpn.trim();
        let index = self
            .items
            .iter()
            .position(|i| i.lpn == lpn)
            .ok_or_else(|| InventoryError::LpnNotFound(lpn.to_string()))?;
        let item = self.remove_at(index);
        info!(lpn = %item.lpn, "Pallet dispatched");
        Ok(item)
    }

    /// Dispatches every known LPN in `lpns`; unknown ones are skipped.
    pub fn dispatch_many<S: AsRef<str>>(&mut self, lpns: &[S]) -> Vec<InventoryItem> {
        lpns.iter()
            .filter_map(|lpn| match self.dispatch(lpn.as_ref()) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(error = %err, "Skipping dispatch");
                    None
                }
            })
            .collect()
    }

    /// Deletes mis-received items. Only pending items are removed; racked
    /// items must be dispatched instead.
    pub fn delete_pending<S: AsRef<str>>(&mut self, lpns: &[S]) -> Vec<InventoryItem> {
        let mut removed = Vec::new();
        for lpn in lpns {
            let lpn = lpn.as_ref().trim();
            match self.items.iter().position(|i| i.lpn == lpn) {
                Some(index) if self.items[index].is_pending() => {
                    removed.push(self.remove_at(index));
                }
                Some(_) => warn!(lpn, "Refusing to delete a racked pallet"),
                None => warn!(lpn, "LPN not found for deletion"),
            }
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "Deleted pending pallets");
        }
        removed
    }

    /// Corrects the expiration date recorded at reception.
    pub fn set_expiration_date(
        &mut self,
        lpn: &str,
        expiration_date: NaiveDate,
    ) -> Result<(), InventoryError> {
        let item = self
            .find_mut(lpn)
            .ok_or_else(|| InventoryError::LpnNotFound(lpn.trim().to_string()))?;
        item.expiration_date = expiration_date;
        Ok(())
    }

    /// Attaches a photo reference, up to [`MAX_PHOTOS`] per item.
    pub fn add_photo(&mut self, lpn: &str, reference: impl Into<String>) -> Result<(), InventoryError> {
        let item = self
            .find_mut(lpn)
            .ok_or_else(|| InventoryError::LpnNotFound(lpn.trim().to_string()))?;
        if item.photos.len() >= MAX_PHOTOS {
            return Err(InventoryError::PhotoLimitReached {
                lpn: item.lpn.clone(),
                max: MAX_PHOTOS,
            });
        }
        item.photos.push(reference.into());
        Ok(())
    }

    pub fn remove_photo(&mut self, lpn: &str, index: usize) -> Result<String, InventoryError> {
        let item = self
            .find_mut(lpn)
            .ok_or_else(|| InventoryError::LpnNotFound(lpn.trim().to_string()))?;
        if index >= item.photos.len() {
            return Err(InventoryError::PhotoIndexOutOfRange {
                lpn: item.lpn.clone(),
                index,
            });
        }
        Ok(item.photos.remove(index))
    }

    /// Latest expiration held for `product_code`, counting mixed pallet lines.
    pub fn latest_expiration_for(&self, product_code: &str) -> Option<NaiveDate> {
        self.items
            .iter()
            .flat_map(|item| item.product_expirations())
            .filter(|(code, _)| *code == product_code)
            .map(|(_, date)| date)
            .max()
    }

    /// Units on hand per product code, pending and racked alike.
    pub fn stock_by_product(&self) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for item in &self.items {
            match &item.contents {
                PalletContents::Single {
                    product_code,
                    quantity,
                    ..
                } => *totals.entry(product_code.clone()).or_insert(0) += u64::from(*quantity),
                PalletContents::Mixed { items } => {
                    for line in items {
                        *totals.entry(line.product_code.clone()).or_insert(0) += u64::from(line.quantity);
                    }
                }
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn item(lpn: &str, location: Option<RackLocation>) -> InventoryItem {
        InventoryItem {
            lpn: Lpn::new(lpn),
            contents: PalletContents::Single {
                product_code: "7751234567890".into(),
                product_name: "Arroz Extra Costeño 5kg".into(),
                quantity: 50,
            },
            expiration_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            reception_date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            received_by: "Operador 01".into(),
            photos: Vec::new(),
            location,
        }
    }

    fn loc(level: u32, position: u32) -> RackLocation {
        RackLocation {
            aisle: "A".into(),
            rack_id: 1,
            level,
            position,
        }
    }

    #[test]
    fn from_items_indexes_occupancy() {
        let store = InventoryStore::from_items(vec![
            item("24112600000001", Some(loc(1, 1))),
            item("25112600000026", None),
        ])
        .unwrap();

        assert_eq!(
            store.occupant(SlotKey::new(1, 1, 1)).map(Lpn::as_str),
            Some("24112600000001")
        );
        assert!(!store.is_occupied(SlotKey::new(1, 1, 2)));
        assert_eq!(store.pending().count(), 1);
        assert_eq!(store.racked().count(), 1);
    }

    #[test]
    fn from_items_rejects_double_booking() {
        let result = InventoryStore::from_items(vec![
            item("24112600000001", Some(loc(1, 1))),
            item("24112600000002", Some(loc(1, 1))),
        ]);
        assert_matches!(result, Err(InventoryError::DuplicateLocation { .. }));
    }

    #[test]
    fn insert_rejects_duplicate_lpn() {
        let mut store = InventoryStore::new();
        store.insert(item("25112600000026", None)).unwrap();
        assert_matches!(
            store.insert(item("25112600000026", None)),
            Err(InventoryError::DuplicateLpn(_))
        );
    }

    #[test]
    fn apply_assignment_rechecks_slot() {
        let mut store = InventoryStore::from_items(vec![
            item("25112600000026", None),
            item("25112600000027", None),
        ])
        .unwrap();

        store
            .apply_assignment(&Lpn::new("25112600000026"), &loc(5, 1))
            .unwrap();
        let err = store
            .apply_assignment(&Lpn::new("25112600000027"), &loc(5, 1))
            .unwrap_err();
        assert_matches!(
            err,
            InventoryError::Assignment(AssignmentError::SlotOccupied { .. })
        );

        let err = store
            .apply_assignment(&Lpn::new("25112600000026"), &loc(5, 2))
            .unwrap_err();
        assert_matches!(
            err,
            InventoryError::Assignment(AssignmentError::LpnAlreadyAssigned { .. })
        );
    }

    #[test]
    fn dispatch_frees_slot() {
        let mut store =
            InventoryStore::from_items(vec![item("24112600000001", Some(loc(1, 1)))]).unwrap();
        let removed = store.dispatch("24112600000001").unwrap();
        assert_eq!(removed.lpn, "24112600000001");
        assert!(!store.is_occupied(SlotKey::new(1, 1, 1)));
        assert_matches!(
            store.dispatch("24112600000001"),
            Err(InventoryError::LpnNotFound(_))
        );
    }

    #[test]
    fn delete_pending_keeps_racked_items() {
        let mut store = InventoryStore::from_items(vec![
            item("24112600000001", Some(loc(1, 1))),
            item("25112600000026", None),
        ])
        .unwrap();
        let removed = store.delete_pending(&["24112600000001", "25112600000026", "nope"]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].lpn, "25112600000026");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn photos_can_be_added_and_removed() {
        let mut store = InventoryStore::from_items(vec![item("25112600000026", None)]).unwrap();
        store.add_photo("25112600000026", "photo-1.jpg").unwrap();
        store.add_photo("25112600000026", "photo-2.jpg").unwrap();
        assert_eq!(store.remove_photo("25112600000026", 0).unwrap(), "photo-1.jpg");
        assert_matches!(
            store.remove_photo("25112600000026", 5),
            Err(InventoryError::PhotoIndexOutOfRange { index: 5, .. })
        );
        assert_eq!(store.find("25112600000026").unwrap().photos, vec!["photo-2.jpg"]);
    }

    #[test]
    fn expiration_date_can_be_corrected() {
        let mut store = InventoryStore::from_items(vec![item("25112600000026", None)]).unwrap();
        let corrected = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        store.set_expiration_date(" 25112600000026 ", corrected).unwrap();
        assert_eq!(store.find("25112600000026").unwrap().expiration_date, corrected);
        assert_matches!(
            store.set_expiration_date("00000000000000", corrected),
            Err(InventoryError::LpnNotFound(ref lpn)) if lpn == "00000000000000"
        );
    }

    #[test]
    fn stock_totals_are_widened() {
        let mut first = item("24112600000001", None);
        let mut second = item("24112600000002", None);
        for pallet in [&mut first, &mut second] {
            pallet.contents = PalletContents::Single {
                product_code: "7751234567890".into(),
                product_name: "Arroz Extra Costeño 5kg".into(),
                quantity: u32::MAX,
            };
        }
        let store = InventoryStore::from_items(vec![first, second]).unwrap();
        assert_eq!(
            store.stock_by_product().get("7751234567890"),
            Some(&(2 * u64::from(u32::MAX)))
        );
    }

    #[test]
    fn dispatch_many_skips_unknown_lpns() {
        let mut store = InventoryStore::from_items(vec![
            item("24112600000001", Some(loc(1, 1))),
            item("25112600000026", None),
        ])
        .unwrap();

        let dispatched = store.dispatch_many(&[" 24112600000001 ", "99999999999999", "25112600000026"]);

        let lpns: Vec<&str> = dispatched.iter().map(|i| i.lpn.as_str()).collect();
        assert_eq!(lpns, vec!["24112600000001", "25112600000026"]);
        assert!(store.is_empty());
        assert!(!store.is_occupied(SlotKey::new(1, 1, 1)));
    }

    #[test]
    fn photos_are_capped_per_item() {
        let mut store = InventoryStore::from_items(vec![item("25112600000026", None)]).unwrap();
        for n in 0..MAX_PHOTOS {
            store.add_photo("25112600000026", format!("photo-{n}.jpg")).unwrap();
        }
        assert_matches!(
            store.add_photo("25112600000026", "one-too-many.jpg"),
            Err(InventoryError::PhotoLimitReached { max: 5, .. })
        );
        assert_eq!(store.find("25112600000026").unwrap().photos.len(), MAX_PHOTOS);

        store.remove_photo("25112600000026", 0).unwrap();
        store.add_photo("25112600000026", "replacement.jpg").unwrap();
    }

    #[test]
    fn latest_expiration_tracks_product() {
        let mut later = item("24112600000002", None);
        later.expiration_date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let store =
            InventoryStore::from_items(vec![item("24112600000001", None), later]).unwrap();
        assert_eq!(
            store.latest_expiration_for("7751234567890"),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
        assert_eq!(store.latest_expiration_for("missing"), None);
        assert_eq!(store.stock_by_product().get("7751234567890"), Some(&100));
    }
}
