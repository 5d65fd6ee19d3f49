//! Field catalog: the placeholder fields a template can reference

use serde::{Deserialize, Serialize};

/// Catalog field names, in drawing order
pub const STANDARD_FIELDS: [&str; 12] = [
    "SOCIETE",
    "NOM",
    "PRENOM",
    "ADRESSE",
    "CP",
    "VILLE",
    "TELEPHONE",
    "E Mail 1",
    "E Mail 2",
    "NUMERO ADHERENT",
    "MONTANT",
    "DATE ECHEANCE",
];

/// Build the `{{NAME}}` placeholder token for a field name
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Extract the field name from a `{{NAME}}` placeholder token
pub fn placeholder_name(token: &str) -> Option<&str> {
    token
        .trim()
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalogEntry {
    pub name: String,
    pub placeholder: String,
}

impl FieldCatalogEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            placeholder: placeholder(name),
        }
    }
}

/// Ordered list of catalog entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    entries: Vec<FieldCatalogEntry>,
}

impl FieldCatalog {
    /// The deployment's standard member fields
    pub fn standard() -> Self {
        Self::from_names(&STANDARD_FIELDS)
    }

    /// Build a catalog from field names; duplicates keep their first position
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut entries: Vec<FieldCatalogEntry> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !entries.iter().any(|e| e.name == name) {
                entries.push(FieldCatalogEntry::new(name));
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[FieldCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldCatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
