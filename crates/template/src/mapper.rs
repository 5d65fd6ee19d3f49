//! Automatic header -> catalog field matching

use crate::catalog::FieldCatalog;
use crate::mapping::Mapping;
use fr_text::{eq_folded, eq_ignore_case};
use log::debug;

/// How a catalog field was matched to a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    AccentInsensitive,
    /// No header matched; the catalog name is used as the key
    Unmatched,
}

/// Matches imported column headers against a field catalog
pub struct FieldMapper<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> FieldMapper<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Find the header for a field name
    ///
    /// Each rule scans the whole header list before the next, looser rule
    /// is tried; within a rule the first header in order wins.
    pub fn find_header<'h>(
        &self,
        field: &str,
        headers: &'h [String],
    ) -> (Option<&'h str>, MatchKind) {
        if let Some(h) = headers.iter().find(|h| h.as_str() == field) {
            return (Some(h.as_str()), MatchKind::Exact);
        }
        if let Some(h) = headers.iter().find(|h| eq_ignore_case(h.as_str(), field)) {
            return (Some(h.as_str()), MatchKind::CaseInsensitive);
        }
        if let Some(h) = headers.iter().find(|h| eq_folded(h.as_str(), field)) {
            return (Some(h.as_str()), MatchKind::AccentInsensitive);
        }
        (None, MatchKind::Unmatched)
    }

    /// Map every catalog field to a key
    ///
    /// The key is the matched header in its original casing, or the catalog
    /// name when nothing matched. Every catalog field yields exactly one entry.
    pub fn map_headers(&self, headers: &[String]) -> Mapping {
        let mut mapping = Mapping::new();
        for entry in self.catalog.entries() {
            let (header, kind) = self.find_header(&entry.name, headers);
            if kind == MatchKind::Unmatched {
                debug!("no column for field '{}', keeping catalog name", entry.name);
            }
            mapping.insert(header.unwrap_or(&entry.name), entry.placeholder.clone());
        }
        mapping
    }
}

/// Build the mapping for a template from imported headers
///
/// The template content does not influence matching; it is only logged.
pub fn auto_map_fields(
    template_bytes: &[u8],
    headers: &[String],
    catalog: &FieldCatalog,
) -> Mapping {
    debug!(
        "auto-mapping {} headers onto {} catalog fields (template: {} bytes)",
        headers.len(),
        catalog.len(),
        template_bytes.len()
    );
    FieldMapper::new(catalog).map_headers(headers)
}
