//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening PDF documents from bytes and saving them back to bytes
//! - Synthesizing a blank A4 document when no template file exists
//! - Inserting text at specific coordinates with the standard base fonts
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! doc.set_font(StandardFont::HelveticaBold, 16.0);
//! doc.insert_text("Appel de cotisation CPME", 1, 50.0, 60.0, Align::Left)?;
//! let filled = doc.to_bytes()?;
//! ```

mod document;
mod standard;
mod text;

pub use document::{Color, PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use standard::{encode_literal, win_ansi_byte, StandardFont};
pub use text::{generate_text_operators, simple_word_wrap, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
