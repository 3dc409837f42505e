use serde_json::Value;
use std::collections::HashMap;

use super::SnapshotStore;
use crate::errors::StorageError;

/// An in-memory store backed by a HashMap.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.data.get(slot).cloned())
    }

    fn put(&mut self, slot: &str, value: Value) -> Result<(), StorageError> {
        self.data.insert(slot.to_string(), value);
        Ok(())
    }
}
