//! Template engine - field mapping and document filling
//!
//! This crate provides:
//! - Template metadata types
//! - The field catalog and `{{FIELD}}` placeholders
//! - Automatic header -> field mapping
//! - Filling a template PDF with one data row
//!
//! # Example
//!
//! ```ignore
//! use template::{auto_map_fields, generate_filled_pdf, FieldCatalog};
//!
//! let catalog = FieldCatalog::standard();
//! let mapping = auto_map_fields(&template_bytes, &headers, &catalog);
//! let pdf_bytes = generate_filled_pdf(&template_bytes, &row, &mapping)?;
//! ```

pub mod catalog;
pub mod filler;
pub mod mapper;
pub mod mapping;
pub mod parser;
mod schema;

pub use catalog::{placeholder, placeholder_name, FieldCatalog, FieldCatalogEntry, STANDARD_FIELDS};
pub use filler::{format_field_line, generate_filled_pdf, DocumentFiller, DEFAULT_TITLE};
pub use mapper::{auto_map_fields, FieldMapper, MatchKind};
pub use mapping::{Mapping, MappingEntry};
pub use parser::{parse_template, resolve_field, resolve_text, value_to_string, DataRow};
pub use schema::*;

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template: {0}")]
    ParseError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Bytes of the blank one-page template used when none is supplied
pub fn default_template_bytes() -> Result<Vec<u8>> {
    Ok(pdf_core::PdfDocument::blank_a4().to_bytes()?)
}
