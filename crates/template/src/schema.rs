//! Template metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of document a template produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Invoice
    Facture,
    /// Dues call
    #[default]
    Appel,
    /// Payment reminder
    Rappel,
    Autre,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Facture => "facture",
            TemplateKind::Appel => "appel",
            TemplateKind::Rappel => "rappel",
            TemplateKind::Autre => "autre",
        }
    }
}

/// Uploaded document blueprint with its mappable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Identifier, unique within a scope
    pub id: String,

    pub name: String,

    /// Inline file content as a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Remote location of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Catalog field names used by the template
    #[serde(default)]
    pub mapping_fields: Vec<String>,

    #[serde(rename = "type", default)]
    pub kind: TemplateKind,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Admin templates flagged permanent are mirrored into the shared scope
    #[serde(default)]
    pub permanent: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl Template {
    /// Create a template with no file attached
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TemplateKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file: None,
            file_url: None,
            mapping_fields: Vec::new(),
            kind,
            created_at: Utc::now(),
            last_updated: None,
            permanent: false,
            organization_id: None,
        }
    }

    /// Set mapping fields, dropping duplicates while keeping first positions
    pub fn with_mapping_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.mapping_fields.clear();
        for field in fields {
            let field = field.as_ref();
            if !self.mapping_fields.iter().any(|f| f == field) {
                self.mapping_fields.push(field.to_string());
            }
        }
        self
    }

    pub fn with_file(mut self, data_url: impl Into<String>) -> Self {
        self.file = Some(data_url.into());
        self
    }

    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }

    pub fn has_file(&self) -> bool {
        self.file.as_deref().is_some_and(|f| !f.is_empty())
            || self.file_url.as_deref().is_some_and(|f| !f.is_empty())
    }
}
