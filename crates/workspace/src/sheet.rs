//! Spreadsheet import

use crate::storage::{keys, read_json, write_json, StoragePort};
use crate::{Result, WorkspaceError};
use log::{info, warn};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use template::DataRow;

/// Imported tabular data: headers in column order, one JSON object per row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<DataRow>,
}

impl ImportedSheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows at the given indices, skipping out-of-range ones
    pub fn select(&self, indices: &[usize]) -> Vec<DataRow> {
        indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect()
    }
}

/// Pick `;` when the header line has more of them than commas
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Suffix repeated headers with ` (2)`, ` (3)`, ... so no column is lost
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        let mut n = 2;
        while !seen.insert(name.clone()) {
            name = format!("{header} ({n})");
            n += 1;
        }
        if name != header {
            warn!("duplicate column '{header}' renamed to '{name}'");
        }
        out.push(name);
    }
    out
}

/// Parse CSV bytes into a sheet
///
/// Headers and cells are trimmed, a UTF-8 BOM is ignored, blank rows are
/// skipped and short rows are padded with empty cells. Repeated headers are
/// renamed by [`dedupe_headers`].
pub fn import_csv(bytes: &[u8]) -> Result<ImportedSheet> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    let first_line = text.lines().next().unwrap_or("");
    if first_line.trim().is_empty() {
        return Err(WorkspaceError::EmptySheet);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = dedupe_headers(reader.headers()?.iter().map(str::to_string).collect());
    if headers.iter().all(String::is_empty) {
        return Err(WorkspaceError::EmptySheet);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: DataRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), Value::String(record.get(i).unwrap_or("").to_string())))
            .collect();
        rows.push(row);
    }

    info!("imported {} rows with {} columns", rows.len(), headers.len());
    Ok(ImportedSheet { headers, rows })
}

/// Persisted spreadsheet blob
pub struct SheetStore<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
}

impl<'a, S: StoragePort + ?Sized> SheetStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn save(&self, sheet: &ImportedSheet) -> Result<()> {
        write_json(self.storage, keys::SPREADSHEET_DATA, sheet)
    }

    pub fn load(&self) -> Result<Option<ImportedSheet>> {
        read_json(self.storage, keys::SPREADSHEET_DATA)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.delete(keys::SPREADSHEET_DATA)
    }
}
