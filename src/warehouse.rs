use tracing::{info, instrument};

use crate::errors::{ServiceError, StorageError};
use crate::lpn::LpnSequence;
use crate::persistence::{slots, SnapshotStore};
use crate::repositories::inventory::InventoryStore;
use crate::repositories::topology::TopologyStore;
use crate::services::putaway::PutawayResolver;

/// All warehouse state: topology, active inventory and the LPN counter.
///
/// Reads borrow the stores directly; writes go through
/// [`crate::commands::Command`] implementations or the store methods.
#[derive(Debug, Clone, Default)]
pub struct Warehouse {
    pub topology: TopologyStore,
    pub inventory: InventoryStore,
    pub sequence: LpnSequence,
}

impl Warehouse {
    pub fn new(topology: TopologyStore, inventory: InventoryStore, sequence: LpnSequence) -> Self {
        Self {
            topology,
            inventory,
            sequence,
        }
    }

    /// Empty warehouse whose last issued correlative is `last`.
    pub fn with_sequence(last: u64) -> Self {
        Self {
            sequence: LpnSequence::starting_at(last),
            ..Default::default()
        }
    }

    pub fn resolver(&self) -> PutawayResolver<'_> {
        PutawayResolver::new(&self.topology, &self.inventory)
    }

    /// Restores state from `store`. Returns `None` when nothing was saved yet.
    #[instrument(skip(store))]
    pub fn load<S: SnapshotStore + ?Sized>(store: &S) -> Result<Option<Self>, ServiceError> {
        let zones = store.get(slots::ZONES)?;
        let racks = store.get(slots::RACKS)?;
        let items = store.get(slots::INVENTORY)?;
        let sequence = store.get(slots::SEQUENCE)?;

        if zones.is_none() && racks.is_none() && items.is_none() && sequence.is_none() {
            return Ok(None);
        }

        let zones = decode(slots::ZONES, zones)?.unwrap_or_default();
        let racks = decode(slots::RACKS, racks)?.unwrap_or_default();
        let items = decode(slots::INVENTORY, items)?.unwrap_or_default();
        let sequence = decode(slots::SEQUENCE, sequence)?.unwrap_or_default();

        let warehouse = Self::new(
            TopologyStore::from_parts(zones, racks),
            InventoryStore::from_items(items)?,
            sequence,
        );
        info!(
            zones = warehouse.topology.zones().len(),
            racks = warehouse.topology.racks().len(),
            items = warehouse.inventory.len(),
            "Warehouse state loaded"
        );
        Ok(Some(warehouse))
    }

    /// Writes every slot to `store` and flushes it.
    #[instrument(skip(self, store))]
    pub fn save<S: SnapshotStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.put(slots::ZONES, serde_json::to_value(self.topology.zones())?)?;
        store.put(slots::RACKS, serde_json::to_value(self.topology.racks())?)?;
        store.put(slots::INVENTORY, serde_json::to_value(self.inventory.items())?)?;
        store.put(slots::SEQUENCE, serde_json::to_value(self.sequence)?)?;
        store.flush()
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    slot: &str,
    value: Option<serde_json::Value>,
) -> Result<Option<T>, StorageError> {
    value
        .map(|v| {
            serde_json::from_value(v).map_err(|err| StorageError::Corrupt {
                slot: slot.to_string(),
                reason: err.to_string(),
            })
        })
        .transpose()
}
