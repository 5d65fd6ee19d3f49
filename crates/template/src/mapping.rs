//! Field mapping: source key -> placeholder token

use crate::catalog::placeholder_name;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Source column used to read the row value (matched header or catalog name)
    pub key: String,
    /// `{{FIELD}}` placeholder the value stands for
    pub placeholder: String,
}

impl MappingEntry {
    /// Catalog field name carried by the placeholder, or the key itself
    pub fn field_name(&self) -> &str {
        placeholder_name(&self.placeholder).unwrap_or(&self.key)
    }
}

/// Ordered key -> placeholder association
///
/// Serialized as a JSON object; entry order is kept so filled documents
/// list fields in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the placeholder for `key`
    pub fn insert(&mut self, key: impl Into<String>, placeholder: impl Into<String>) {
        let key = key.into();
        let placeholder = placeholder.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.placeholder = placeholder,
            None => self.entries.push(MappingEntry { key, placeholder }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.placeholder.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, placeholder) in iter {
            mapping.insert(key, placeholder);
        }
        mapping
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.placeholder)?;
        }
        map.end()
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = Mapping;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of source key to placeholder")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Mapping, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, placeholder)) = access.next_entry::<String, String>()? {
            mapping.insert(key, placeholder);
        }
        Ok(mapping)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingVisitor)
    }
}
