//! WASM bindings for the CPME tool
//!
//! This crate provides a JavaScript-friendly API for:
//! - Mapping spreadsheet headers onto template fields
//! - Filling a template PDF with one row
//! - The persisted workspace (templates, mappings, documents, licenses)
//!   backed by `localStorage`, with bulk generation through browser downloads
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CpmeWorkspace, autoMapFields } from 'cpme-wasm';
//!
//! await init();
//!
//! const ws = new CpmeWorkspace();
//! ws.setNotifier((n) => toast(n.level, n.title, n.message));
//!
//! const sheet = ws.importCsv(csvBytes);
//! ws.selectTemplate('appel-2025');
//! const records = ws.generatePdfs([0, 1, 2]);
//! ```

mod browser;

pub use browser::{BrowserDownloads, JsNotifier, LocalStorage};

use browser::to_js;
use chrono::Utc;
use js_sys::Function;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use template::{FieldCatalog, Mapping, Template};
use wasm_bindgen::prelude::*;
use workspace::{
    fill_document, import_csv, BulkGenerator, DocumentLog, LicenseRegistry, LicenseStatus, LoadedTemplate,
    MappingConfigs, NewLicense, Notification, Notifier, SheetStore, TemplateScope, TemplateStore,
    WorkspaceError,
};

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn parse_scope(scope: &str) -> Result<TemplateScope, JsValue> {
    match scope {
        "admin" => Ok(TemplateScope::Admin),
        "shared" => Ok(TemplateScope::Shared),
        other => Err(JsValue::from_str(&format!("unknown template scope '{other}'"))),
    }
}

/// Map column headers onto the standard field catalog
///
/// @param templateBytes - Template PDF bytes (Uint8Array)
/// @param headers - Column headers (string[])
/// @returns Object of source key -> `{{FIELD}}` placeholder
#[wasm_bindgen(js_name = autoMapFields)]
pub fn auto_map_fields(template_bytes: &[u8], headers: JsValue) -> Result<JsValue, JsValue> {
    let headers: Vec<String> = from_js(headers)?;
    let mapping = template::auto_map_fields(template_bytes, &headers, &FieldCatalog::standard());
    to_js(&mapping)
}

/// Fill a template with one data row
///
/// Failures are reported on the console before being thrown.
///
/// @param templateBytes - Template PDF bytes (Uint8Array)
/// @param row - Data row object
/// @param mapping - Mapping object from autoMapFields()
/// @returns PDF bytes (Uint8Array)
#[wasm_bindgen(js_name = generateFilledPdf)]
pub fn generate_filled_pdf(
    template_bytes: &[u8],
    row: JsValue,
    mapping: JsValue,
) -> Result<Vec<u8>, JsValue> {
    fill_with(template_bytes, row, mapping, &JsNotifier::default())
}

fn fill_with(
    template_bytes: &[u8],
    row: JsValue,
    mapping: JsValue,
    notifier: &dyn Notifier,
) -> Result<Vec<u8>, JsValue> {
    let row: template::DataRow = from_js(row)?;
    let mapping: Mapping = from_js(mapping)?;
    fill_document(template_bytes, &row, &mapping, notifier).map_err(js_err)
}

/// Blank one-page PDF used when a template has no file
#[wasm_bindgen(js_name = defaultTemplatePdf)]
pub fn default_template_pdf() -> Result<Vec<u8>, JsValue> {
    template::default_template_bytes().map_err(js_err)
}

/// French formatting helpers
#[wasm_bindgen]
pub struct FrFormatter;

#[wasm_bindgen]
impl FrFormatter {
    /// Normalize a date to `dd/mm/yyyy`, returning the input when unparseable
    #[wasm_bindgen(js_name = normalizeDate)]
    pub fn normalize_date(text: &str) -> String {
        fr_text::normalize_date(text)
    }

    /// Format an amount in euros (e.g. "1 234,56 €")
    #[wasm_bindgen(js_name = formatEuros)]
    pub fn format_euros(amount: f64) -> String {
        fr_text::format_euros(amount)
    }

    /// Display size of a byte count (e.g. "12.3 Ko")
    #[wasm_bindgen(js_name = formatSize)]
    pub fn format_size(bytes: f64) -> String {
        fr_text::format_size(bytes.max(0.0) as u64)
    }

    #[wasm_bindgen(js_name = sanitizeFilename)]
    pub fn sanitize_filename(text: &str) -> String {
        fr_text::sanitize_filename(text)
    }
}

/// Persisted workspace backed by `localStorage`
#[wasm_bindgen]
pub struct CpmeWorkspace {
    storage: LocalStorage,
    notifier: JsNotifier,
    selected: Option<LoadedTemplate>,
    last_error: Option<String>,
}

#[wasm_bindgen]
impl CpmeWorkspace {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<CpmeWorkspace, JsValue> {
        Ok(CpmeWorkspace {
            storage: LocalStorage::new()?,
            notifier: JsNotifier::default(),
            selected: None,
            last_error: None,
        })
    }

    /// Message of the last failed selection or generation, or undefined
    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    /// Receive notifications as `{ level, title, message, action }`
    ///
    /// @param callback - Function, or undefined to log instead
    #[wasm_bindgen(js_name = setNotifier)]
    pub fn set_notifier(&mut self, callback: Option<Function>) {
        self.notifier.set_callback(callback);
    }

    /// Import CSV bytes and persist them as the current sheet
    ///
    /// @returns `{ headers, rows }`
    #[wasm_bindgen(js_name = importCsv)]
    pub fn import_csv(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        let sheet = import_csv(data).map_err(js_err)?;
        SheetStore::new(&self.storage).save(&sheet).map_err(js_err)?;
        to_js(&sheet)
    }

    /// Current sheet, or null
    #[wasm_bindgen(js_name = loadSheet)]
    pub fn load_sheet(&self) -> Result<JsValue, JsValue> {
        let sheet = SheetStore::new(&self.storage).load().map_err(js_err)?;
        to_js(&sheet)
    }

    #[wasm_bindgen(js_name = listTemplates)]
    pub fn list_templates(&self, scope: &str) -> Result<JsValue, JsValue> {
        let templates = TemplateStore::new(&self.storage)
            .list(parse_scope(scope)?)
            .map_err(js_err)?;
        to_js(&templates)
    }

    #[wasm_bindgen(js_name = getTemplate)]
    pub fn get_template(&self, id: &str, scope: &str) -> Result<JsValue, JsValue> {
        let template = TemplateStore::new(&self.storage)
            .get(id, parse_scope(scope)?)
            .map_err(js_err)?;
        to_js(&template)
    }

    #[wasm_bindgen(js_name = saveTemplate)]
    pub fn save_template(&self, template: JsValue, scope: &str) -> Result<(), JsValue> {
        let template: Template = from_js(template)?;
        TemplateStore::new(&self.storage)
            .save(template, parse_scope(scope)?)
            .map_err(js_err)
    }

    /// Delete a template and its saved mapping
    ///
    /// @returns whether the template existed
    #[wasm_bindgen(js_name = deleteTemplate)]
    pub fn delete_template(&mut self, id: &str, scope: &str) -> Result<bool, JsValue> {
        let deleted = TemplateStore::new(&self.storage)
            .delete(id, parse_scope(scope)?)
            .map_err(js_err)?;
        if deleted {
            MappingConfigs::new(&self.storage).delete(id).map_err(js_err)?;
            if self.selected.as_ref().is_some_and(|l| l.template.id == id) {
                self.selected = None;
            }
        }
        Ok(deleted)
    }

    /// Select a template by id and preload its PDF
    #[wasm_bindgen(js_name = selectTemplate)]
    pub fn select_template(&mut self, id: &str) -> Result<(), JsValue> {
        let template = TemplateStore::new(&self.storage)
            .get(id, TemplateScope::Shared)
            .map_err(js_err)?
            .ok_or_else(|| js_err(WorkspaceError::TemplateNotFound(id.to_string())))?;

        self.selected = None;
        match LoadedTemplate::load(template) {
            Ok(loaded) => {
                self.selected = Some(loaded);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::from_error(&e));
                self.last_error = Some(e.to_string());
                Err(js_err(e))
            }
        }
    }

    /// Select a template whose PDF the caller fetched (e.g. from `fileUrl`)
    #[wasm_bindgen(js_name = selectTemplateWithBytes)]
    pub fn select_template_with_bytes(&mut self, template: JsValue, bytes: &[u8]) -> Result<(), JsValue> {
        let template: Template = from_js(template)?;
        self.selected = Some(LoadedTemplate::with_bytes(template, bytes.to_vec()));
        Ok(())
    }

    /// Fill one document, reporting failures through the notifier
    #[wasm_bindgen(js_name = generateFilledPdf)]
    pub fn generate_filled_pdf(
        &self,
        template_bytes: &[u8],
        row: JsValue,
        mapping: JsValue,
    ) -> Result<Vec<u8>, JsValue> {
        fill_with(template_bytes, row, mapping, &self.notifier)
    }

    #[wasm_bindgen(js_name = saveMapping)]
    pub fn save_mapping(&self, template_id: &str, mapping: JsValue) -> Result<(), JsValue> {
        let mapping: Mapping = from_js(mapping)?;
        MappingConfigs::new(&self.storage)
            .save(template_id, &mapping)
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = loadMapping)]
    pub fn load_mapping(&self, template_id: &str) -> Result<JsValue, JsValue> {
        let mapping = MappingConfigs::new(&self.storage)
            .load(template_id)
            .map_err(js_err)?;
        to_js(&mapping)
    }

    /// Generate, download and record one PDF per selected sheet row
    ///
    /// Uses the mapping saved for the selected template, or maps the sheet
    /// headers automatically when none was saved.
    ///
    /// The failure message stays readable through `lastError` until the
    /// next successful run.
    ///
    /// @param rowIndices - Indices into the current sheet (number[])
    /// @returns Recorded documents
    #[wasm_bindgen(js_name = generatePdfs)]
    pub fn generate_pdfs(&mut self, row_indices: JsValue) -> Result<JsValue, JsValue> {
        let indices: Vec<usize> = from_js(row_indices)?;
        let sheet = SheetStore::new(&self.storage)
            .load()
            .map_err(js_err)?
            .unwrap_or_default();
        let rows = sheet.select(&indices);

        let mut generator = BulkGenerator::new(&self.storage, &self.notifier);
        let mapping = match &self.selected {
            Some(loaded) => {
                generator.select_loaded(loaded.clone());
                MappingConfigs::new(&self.storage)
                    .load(&loaded.template.id)
                    .map_err(js_err)?
                    .unwrap_or_else(|| {
                        template::auto_map_fields(&loaded.bytes, &sheet.headers, &FieldCatalog::standard())
                    })
            }
            None => Mapping::new(),
        };

        let result =
            generator.generate_pdfs(&rows, &mapping, &BrowserDownloads, Utc::now().date_naive());
        let last_error = generator.last_error();
        drop(generator);

        self.last_error = last_error;
        to_js(&result.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = listDocuments)]
    pub fn list_documents(&self) -> Result<JsValue, JsValue> {
        let documents = DocumentLog::new(&self.storage).list().map_err(js_err)?;
        to_js(&documents)
    }

    #[wasm_bindgen(js_name = markDocumentSent)]
    pub fn mark_document_sent(&self, id: &str) -> Result<JsValue, JsValue> {
        let document = DocumentLog::new(&self.storage).mark_sent(id).map_err(js_err)?;
        to_js(&document)
    }

    /// @param ids - Document ids (string[])
    /// @returns Number of deleted documents
    #[wasm_bindgen(js_name = bulkDeleteDocuments)]
    pub fn bulk_delete_documents(&self, ids: JsValue) -> Result<usize, JsValue> {
        let ids: Vec<String> = from_js(ids)?;
        DocumentLog::new(&self.storage)
            .bulk_delete(&ids, &self.notifier)
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = listLicenses)]
    pub fn list_licenses(&self) -> Result<JsValue, JsValue> {
        let licenses = LicenseRegistry::new(&self.storage).list().map_err(js_err)?;
        to_js(&licenses)
    }

    /// @param license - `{ cpme, plan, status?, startDate, endDate }`
    #[wasm_bindgen(js_name = createLicense)]
    pub fn create_license(&self, license: JsValue) -> Result<JsValue, JsValue> {
        let new: NewLicense = from_js(license)?;
        let created = LicenseRegistry::new(&self.storage)
            .create(new)
            .map_err(js_err)?;
        to_js(&created)
    }

    #[wasm_bindgen(js_name = setLicenseStatus)]
    pub fn set_license_status(&self, id: &str, status: JsValue) -> Result<JsValue, JsValue> {
        let status: LicenseStatus = from_js(status)?;
        let license = LicenseRegistry::new(&self.storage)
            .set_status(id, status)
            .map_err(js_err)?;
        to_js(&license)
    }

    #[wasm_bindgen(js_name = deleteLicense)]
    pub fn delete_license(&self, id: &str) -> Result<(), JsValue> {
        LicenseRegistry::new(&self.storage).delete(id).map_err(js_err)
    }

    /// Expire active licenses past their end date
    ///
    /// @returns Number of licenses expired
    #[wasm_bindgen(js_name = expireOverdueLicenses)]
    pub fn expire_overdue_licenses(&self) -> Result<usize, JsValue> {
        LicenseRegistry::new(&self.storage)
            .expire_overdue(Utc::now().date_naive())
            .map_err(js_err)
    }
}
