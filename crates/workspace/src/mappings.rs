//! Saved per-template mapping configurations

use crate::storage::{keys, read_json, write_json, StoragePort};
use crate::Result;
use log::debug;
use template::Mapping;

pub struct MappingConfigs<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> MappingConfigs<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn save(&self, template_id: &str, mapping: &Mapping) -> Result<()> {
        debug!("saving {} mapping entries for '{template_id}'", mapping.len());
        write_json(self.storage, &keys::mapping_config(template_id), mapping)
    }

    pub fn load(&self, template_id: &str) -> Result<Option<Mapping>> {
        read_json(self.storage, &keys::mapping_config(template_id))
    }

    pub fn delete(&self, template_id: &str) -> Result<()> {
        self.storage.delete(&keys::mapping_config(template_id))
    }
}
