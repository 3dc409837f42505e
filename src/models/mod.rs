pub mod inventory_item;
pub mod product;
pub mod rack;
pub mod zone;

pub use inventory_item::{InventoryItem, MixedItem, PalletContents};
pub use product::Product;
pub use rack::{Rack, RackLocation, RackOccupancy, Slot, SlotKey, SlotStatus};
pub use zone::{Zone, ZoneCategory};
