//! French date, currency, size, and filename formatting

use crate::fold::fold_diacritics;
use crate::{Result, TextError};
use chrono::{Duration, NaiveDate};

/// Spreadsheet serial day zero (1899-12-30, accounts for the 1900 leap-year bug)
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial numbers accepted as spreadsheet dates (1927-05-18 .. 2173-10-14)
const SPREADSHEET_SERIAL_RANGE: std::ops::RangeInclusive<i64> = 10_000..=100_000;

/// Fallback filename stem when nothing printable remains
const DEFAULT_FILE_STEM: &str = "document";

/// French text formatting utilities
pub struct FrFormatter;

impl FrFormatter {
    /// Format a date as `dd/mm/yyyy`
    pub fn format_date(date: NaiveDate) -> String {
        format_date_fr(date)
    }

    /// Format an amount in euros
    pub fn format_euros(amount: f64) -> String {
        format_euros(amount)
    }

    /// Format a byte count for display
    pub fn format_size(bytes: u64) -> String {
        format_size(bytes)
    }
}

/// Format a date as `dd/mm/yyyy`
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fr_text::format_date_fr;
/// let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(format_date_fr(date), "07/03/2025");
/// ```
pub fn format_date_fr(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parse a date cell
///
/// Accepts `dd/mm/yyyy`, `dd-mm-yyyy`, `dd.mm.yyyy`, ISO `yyyy-mm-dd`
/// (optionally followed by a time), and spreadsheet serial day numbers.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();

    for pattern in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Ok(date);
        }
    }

    // ISO timestamps such as 2025-03-07T00:00:00.000Z
    if let Some(prefix) = trimmed.get(..10) {
        if trimmed.len() > 10 && trimmed.as_bytes()[10] == b'T' {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Ok(date);
            }
        }
    }

    if let Ok(serial) = trimmed.parse::<f64>() {
        let days = serial.trunc() as i64;
        if SPREADSHEET_SERIAL_RANGE.contains(&days) {
            let (y, m, d) = SPREADSHEET_EPOCH;
            if let Some(epoch) = NaiveDate::from_ymd_opt(y, m, d) {
                return Ok(epoch + Duration::days(days));
            }
        }
    }

    Err(TextError::InvalidDate(trimmed.to_string()))
}

/// Render a date cell as `dd/mm/yyyy`, keeping the input when it is not a date
pub fn normalize_date(text: &str) -> String {
    match parse_date(text) {
        Ok(date) => format_date_fr(date),
        Err(_) => text.to_string(),
    }
}

/// Parse an amount cell
///
/// Accepts French (`1 234,56 €`) and plain (`1234.56`) notations.
pub fn parse_amount(text: &str) -> Result<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('€')
        .trim_start_matches('€')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202F}')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // "1.234,56": dots are thousand separators
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // "1,234.56": commas are thousand separators
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| TextError::InvalidAmount(text.trim().to_string()))
}

/// Format an amount in euros with French separators (e.g. `1 234,56 €`)
pub fn format_euros(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let int_part = cents / 100;
    let frac_part = cents % 100;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!(
        "{sign}{},{frac_part:02} €",
        format_with_thousands(int_part, ' ')
    )
}

/// Render an amount cell in euros, keeping the input when it is not a number
pub fn normalize_amount(text: &str) -> String {
    match parse_amount(text) {
        Ok(amount) => format_euros(amount),
        Err(_) => text.to_string(),
    }
}

/// Format integer with thousand separators
fn format_with_thousands(n: i64, sep: char) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, sep);
        }
        result.insert(0, c);
    }

    result
}

/// Format a byte count for display (`512 o`, `12.3 Ko`, `1.5 Mo`)
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} o")
    } else if b < MB {
        format!("{:.1} Ko", b / KB)
    } else {
        format!("{:.1} Mo", b / MB)
    }
}

/// Turn arbitrary text into a safe filename stem
///
/// Accents are folded, anything outside `[A-Za-z0-9_-]` becomes `_`,
/// runs of `_` collapse, and leading/trailing `_` are dropped.
///
/// # Examples
/// ```
/// use fr_text::sanitize_filename;
/// assert_eq!(sanitize_filename("Société Générale & Fils"), "Societe_Generale_Fils");
/// assert_eq!(sanitize_filename("   "), "document");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in fold_diacritics(text).chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}
