pub mod inventory;
pub mod topology;

pub use inventory::InventoryStore;
pub use topology::{NewRack, NewZone, TopologyStore};
