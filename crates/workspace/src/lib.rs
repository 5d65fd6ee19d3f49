//! Client-side workspace for the CPME tool
//!
//! This crate provides:
//! - A key-value storage port with an in-memory implementation
//! - Template, mapping and spreadsheet persistence
//! - Generated document records and history
//! - Organization licenses
//! - Bulk generation and bulk email over injected sinks
//! - Typed errors with user-facing categories

pub mod bulk;
pub mod documents;
pub mod email;
mod error;
pub mod license;
pub mod mappings;
pub mod notify;
pub mod sheet;
pub mod storage;
pub mod templates;

pub use bulk::{
    fill_document, BulkGenerator, DownloadSink, GeneratedPdf, LoadedTemplate, MemoryDownloads,
};
pub use documents::{DocumentHistory, DocumentLog, GeneratedDocument, HistoryAction, HistoryEvent};
pub use email::{send_documents, Mailer, MemoryMailer};
pub use error::{ErrorCategory, Result, WorkspaceError};
pub use license::{License, LicenseRegistry, LicenseStatus, NewLicense, Plan};
pub use mappings::MappingConfigs;
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier};
pub use sheet::{dedupe_headers, import_csv, ImportedSheet, SheetStore};
pub use storage::{MemoryStorage, StoragePort};
pub use templates::{TemplateScope, TemplateStore};
