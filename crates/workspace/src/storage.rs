//! Key-value storage port
//!
//! Every persisted piece of client state goes through [`StoragePort`]. The
//! browser build plugs in `localStorage`; tests use [`MemoryStorage`].
//! Values are JSON strings stored under the fixed keys in [`keys`].

use crate::{Result, WorkspaceError};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;

/// Fixed storage keys
pub mod keys {
    pub const SPREADSHEET_DATA: &str = "excel_data";
    pub const ADMIN_TEMPLATES: &str = "admin_templates";
    pub const SHARED_TEMPLATES: &str = "templates";
    pub const DOCUMENTS: &str = "documents";
    pub const DOCUMENT_HISTORY: &str = "document_history";
    pub const LICENSES: &str = "licenses";

    const MAPPING_CONFIG_PREFIX: &str = "mapping_config_";

    /// Key of the saved mapping for a template
    pub fn mapping_config(template_id: &str) -> String {
        format!("{MAPPING_CONFIG_PREFIX}{template_id}")
    }
}

/// String key-value store
///
/// Single writer: implementations are not required to be thread-safe and
/// concurrent sessions may overwrite each other's last write.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

impl<S: StoragePort + ?Sized> StoragePort for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// Read and deserialize a JSON value
pub fn read_json<T, S>(storage: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: StoragePort + ?Sized,
{
    match storage.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| WorkspaceError::Corrupted {
                key: key.to_string(),
                source,
            }),
    }
}

/// Read a JSON list, treating a missing or corrupted value as empty
pub fn read_list<T, S>(storage: &S, key: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: StoragePort + ?Sized,
{
    match read_json(storage, key) {
        Ok(list) => Ok(list.unwrap_or_default()),
        Err(WorkspaceError::Corrupted { key, source }) => {
            warn!("discarding corrupted list under '{key}': {source}");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Serialize and write a JSON value
pub fn write_json<T, S>(storage: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: StoragePort + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
