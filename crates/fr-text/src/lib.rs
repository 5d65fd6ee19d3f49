//! French Text - text processing for French member data
//!
//! This crate provides:
//! - Accent folding for diacritic-insensitive matching
//! - French date formatting (`dd/mm/yyyy`) and lenient date parsing
//! - Euro amount formatting (`1 234,56 €`) and lenient amount parsing
//! - Display sizes and safe filename stems
//!
//! # Example
//!
//! ```ignore
//! use fr_text::{fold_key, normalize_date, sanitize_filename};
//!
//! assert_eq!(fold_key("Société"), "societe");
//! assert_eq!(normalize_date("2025-03-31"), "31/03/2025");
//! assert_eq!(sanitize_filename("ACME SARL"), "ACME_SARL");
//! ```

mod fold;
mod formatter;

pub use fold::{eq_folded, eq_ignore_case, fold_diacritics, fold_key};
pub use formatter::FrFormatter;

// Re-export commonly used formatting functions
pub use formatter::{
    format_date_fr, format_euros, format_size, normalize_amount, normalize_date, parse_amount,
    parse_date, sanitize_filename,
};

use thiserror::Error;

/// Errors that can occur during French text processing
#[derive(Debug, Error)]
pub enum TextError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Result type for French text operations
pub type Result<T> = std::result::Result<T, TextError>;
