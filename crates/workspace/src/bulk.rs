//! Bulk document generation
//!
//! Generation runs in two phases. Phase one fills one PDF per row and stops
//! at the first failure, before anything is downloaded or recorded. Phase
//! two hands every output to the download sink and then records one
//! document per output, whether or not its download succeeded.

use crate::documents::{DocumentLog, GeneratedDocument};
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::storage::StoragePort;
use crate::{Result, WorkspaceError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use fr_text::sanitize_filename;
use log::{debug, info, warn};
use std::cell::RefCell;
use template::{
    default_template_bytes, generate_filled_pdf, value_to_string, DataRow, DocumentFiller, Mapping,
    Template,
};

/// Row keys tried, in order, for the company name used in filenames
pub const COMPANY_KEYS: [&str; 4] = ["SOCIETE", "societe", "Société", "société"];

/// Receives finished files, e.g. as browser downloads
pub trait DownloadSink {
    fn download(&self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Keeps downloaded files in memory
#[derive(Debug, Default)]
pub struct MemoryDownloads {
    files: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.files.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloads {
    fn download(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        self.files
            .borrow_mut()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// A template together with its preloaded PDF bytes
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub template: Template,
    pub bytes: Vec<u8>,
}

impl LoadedTemplate {
    /// Load the template's inline file, or a blank page when it has none
    pub fn load(template: Template) -> Result<Self> {
        let bytes = match template.file.as_deref().filter(|f| !f.is_empty()) {
            Some(data_url) => decode_data_url(data_url)?,
            None => {
                if template.file_url.is_some() {
                    warn!("template '{}' has only a remote file, using a blank page", template.id);
                }
                default_template_bytes()?
            }
        };
        Ok(Self { template, bytes })
    }

    /// Use bytes fetched by the caller
    pub fn with_bytes(template: Template, bytes: Vec<u8>) -> Self {
        Self { template, bytes }
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| WorkspaceError::TemplateFile("expected a base64 data URL".to_string()))?;

    BASE64
        .decode(payload.trim())
        .map_err(|e| WorkspaceError::TemplateFile(e.to_string()))
}

/// Company name of a row, trying each of [`COMPANY_KEYS`]
pub fn company_name(row: &DataRow) -> Option<String> {
    COMPANY_KEYS
        .iter()
        .filter_map(|key| row.get(*key))
        .map(|value| value_to_string(value).trim().to_string())
        .find(|name| !name.is_empty())
}

/// Download filename for the `index`-th output (zero-based)
pub fn output_filename(template: &Template, company: Option<&str>, index: usize) -> String {
    match company {
        Some(name) => format!("{}_{}.pdf", template.kind.as_str(), sanitize_filename(name)),
        None => format!("{}_document_{}.pdf", template.kind.as_str(), index + 1),
    }
}

/// One filled document waiting to be downloaded and recorded
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub filename: String,
    pub company: String,
    pub bytes: Vec<u8>,
}

/// Fill one document, notifying before the error is returned
pub fn fill_document(
    template_bytes: &[u8],
    row: &DataRow,
    mapping: &Mapping,
    notifier: &dyn Notifier,
) -> Result<Vec<u8>> {
    generate_filled_pdf(template_bytes, row, mapping).map_err(|e| {
        let err = WorkspaceError::from(e);
        notifier.notify(Notification::from_error(&err));
        err
    })
}

/// Fills the selected template for many rows
pub struct BulkGenerator<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
    notifier: &'a dyn Notifier,
    filler: DocumentFiller,
    selected: Option<LoadedTemplate>,
    last_error: RefCell<Option<String>>,
}

impl<'a, S: StoragePort + ?Sized> BulkGenerator<'a, S> {
    pub fn new(storage: &'a S, notifier: &'a dyn Notifier) -> Self {
        Self {
            storage,
            notifier,
            filler: DocumentFiller::new(),
            selected: None,
            last_error: RefCell::new(None),
        }
    }

    /// Select a template and preload its bytes
    pub fn select_template(&mut self, template: Template) -> Result<()> {
        self.selected = None;
        let loaded = LoadedTemplate::load(template).map_err(|e| self.fail(e))?;
        debug!(
            "preloaded template '{}' ({} bytes)",
            loaded.template.id,
            loaded.bytes.len()
        );
        self.selected = Some(loaded);
        Ok(())
    }

    pub fn select_loaded(&mut self, loaded: LoadedTemplate) {
        self.selected = Some(loaded);
    }

    pub fn selected(&self) -> Option<&Template> {
        self.selected.as_ref().map(|l| &l.template)
    }

    /// Message of the most recent failure, cleared by a successful run
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// Phase one: fill one PDF per row, aborting on the first failure
    pub fn generate(&self, rows: &[DataRow], mapping: &Mapping) -> Result<Vec<GeneratedPdf>> {
        let loaded = self
            .selected
            .as_ref()
            .ok_or(WorkspaceError::NoTemplateSelected)
            .map_err(|e| self.fail(e))?;

        let mut outputs = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let bytes = self
                .filler
                .fill(&loaded.bytes, row, mapping)
                .map_err(|e| self.fail(e.into()))?;
            let company = company_name(row);
            outputs.push(GeneratedPdf {
                filename: output_filename(&loaded.template, company.as_deref(), index),
                company: company.unwrap_or_default(),
                bytes,
            });
        }
        self.last_error.replace(None);
        Ok(outputs)
    }

    /// Generate, download and record one document per row
    ///
    /// Returns the recorded documents. An empty selection only warns.
    pub fn generate_pdfs(
        &self,
        rows: &[DataRow],
        mapping: &Mapping,
        sink: &dyn DownloadSink,
        today: NaiveDate,
    ) -> Result<Vec<GeneratedDocument>> {
        if rows.is_empty() {
            self.notifier.notify(Notification::warning(
                "Aucune ligne sélectionnée",
                "Sélectionnez au moins une ligne à générer.",
            ));
            return Ok(Vec::new());
        }

        let outputs = self.generate(rows, mapping)?;
        let kind = self
            .selected()
            .map(|t| t.kind.as_str())
            .unwrap_or_default();

        let mut records = Vec::with_capacity(outputs.len());
        for output in &outputs {
            if let Err(e) = sink.download(&output.filename, &output.bytes) {
                let mut n = Notification::from_error(&e);
                n.level = NotificationLevel::Warning;
                self.notifier.notify(n);
            }
            records.push(GeneratedDocument::new(
                output.filename.clone(),
                kind,
                output.bytes.len() as u64,
                output.company.clone(),
                today,
            ));
        }

        DocumentLog::new(self.storage)
            .record_batch(records.clone())
            .map_err(|e| self.fail(e))?;

        info!("generated {} documents", records.len());
        self.notifier.notify(Notification::success(
            "Documents générés",
            format!("{} document(s) généré(s)", records.len()),
        ));
        Ok(records)
    }

    fn fail(&self, err: WorkspaceError) -> WorkspaceError {
        self.last_error.replace(Some(err.to_string()));
        self.notifier.notify(Notification::from_error(&err));
        err
    }
}
