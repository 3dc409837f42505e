use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::SnapshotStore;
use crate::errors::StorageError;

/// All slots in a single JSON document on disk.
///
/// Writes are staged in memory and written on [`SnapshotStore::flush`]
/// through a temporary file and a rename, so a crash mid-write leaves the
/// previous snapshot intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    slots: Map<String, Value>,
    dirty: bool,
}

impl JsonFileStore {
    /// Opens `path`, reading it if it exists. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let slots = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&raw)? {
                    Value::Object(map) => map,
                    other => {
                        return Err(StorageError::Corrupt {
                            slot: path.display().to_string(),
                            reason: format!("expected a JSON object, found {}", kind_of(&other)),
                        })
                    }
                }
            }
        } else {
            debug!(path = %path.display(), "Snapshot file not found; starting empty");
            Map::new()
        };

        Ok(Self {
            path,
            slots,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, slot: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn put(&mut self, slot: &str, value: Value) -> Result<(), StorageError> {
        self.slots.insert(slot.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        let body = serde_json::to_vec_pretty(&self.slots)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        info!(path = %self.path.display(), slots = self.slots.len(), "Snapshot written");
        Ok(())
    }
}
