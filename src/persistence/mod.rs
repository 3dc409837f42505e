//! Best-effort local persistence.
//!
//! State is kept as JSON values under a handful of named slots, mirroring a
//! browser key-value store. Stores know nothing about warehouse types;
//! encoding and decoding happen in [`crate::warehouse::Warehouse`].

use serde_json::Value;

use crate::errors::StorageError;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Slot names used for warehouse snapshots.
pub mod slots {
    pub const INVENTORY: &str = "smartwms_inventory";
    pub const SEQUENCE: &str = "smartwms_sequence";
    pub const RACKS: &str = "smartwms_racks";
    pub const ZONES: &str = "smartwms_zones";
}

/// A key-value store for JSON snapshots.
pub trait SnapshotStore {
    /// Returns the value saved under `slot`, or `None` if never written.
    fn get(&self, slot: &str) -> Result<Option<Value>, StorageError>;

    /// Stages `value` under `slot`.
    fn put(&mut self, slot: &str, value: Value) -> Result<(), StorageError>;

    /// Makes staged writes durable. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}
