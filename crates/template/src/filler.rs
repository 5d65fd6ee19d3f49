//! Document filling
//!
//! Filled documents keep the template's first page as a background and
//! draw a fixed header followed by one `label: value` line per mapped
//! field. Placeholder tokens inside the template's own content are not
//! located or replaced.

use crate::mapping::{Mapping, MappingEntry};
use crate::parser::{resolve_text, DataRow};
use crate::Result;
use fr_text::{eq_ignore_case, normalize_amount, normalize_date};
use log::debug;
use pdf_core::{simple_word_wrap, Align, Color, PdfDocument, StandardFont};

/// Header drawn on every filled document
pub const DEFAULT_TITLE: &str = "Appel de cotisation CPME";

/// Rendered in place of a missing value
pub const MISSING_VALUE: &str = "-";

const PAGE: usize = 1;
const MARGIN_LEFT: f64 = 50.0;
const TITLE_Y: f64 = 60.0;
const TITLE_SIZE: f32 = 18.0;
const FIRST_LINE_Y: f64 = 110.0;
const LINE_HEIGHT: f64 = 20.0;
const BODY_SIZE: f32 = 12.0;
const WRAP_CHARS: usize = 85;

fn title_color() -> Color {
    Color::from_rgb(0, 51, 102)
}

/// Label and value formatting for a known field
struct LabelFormat {
    field: &'static str,
    label: &'static str,
    value: fn(&str) -> String,
}

fn as_is(value: &str) -> String {
    value.to_string()
}

const LABEL_FORMATS: [LabelFormat; 9] = [
    LabelFormat { field: "SOCIETE", label: "Société", value: as_is },
    LabelFormat { field: "ADRESSE", label: "Adresse", value: as_is },
    LabelFormat { field: "CP", label: "Code postal", value: as_is },
    LabelFormat { field: "VILLE", label: "Ville", value: as_is },
    LabelFormat { field: "E Mail 1", label: "Email", value: as_is },
    LabelFormat { field: "E Mail 2", label: "E Mail 2", value: as_is },
    LabelFormat { field: "NUMERO ADHERENT", label: "N° adhérent", value: as_is },
    LabelFormat { field: "MONTANT", label: "Montant", value: normalize_amount },
    LabelFormat { field: "DATE ECHEANCE", label: "Date d'échéance", value: normalize_date },
];

fn label_format(field: &str) -> Option<&'static LabelFormat> {
    LABEL_FORMATS
        .iter()
        .find(|f| f.field == field)
        .or_else(|| LABEL_FORMATS.iter().find(|f| eq_ignore_case(f.field, field)))
}

/// Render the `label: value` line for a field
///
/// Known fields get their label and value formatting; other fields use
/// their own name as label. A missing value renders as `-`.
pub fn format_field_line(field: &str, value: Option<&str>) -> String {
    let format = label_format(field);
    let label = format.map_or(field, |f| f.label);
    let value = match (value, format) {
        (None, _) => MISSING_VALUE.to_string(),
        (Some(v), Some(f)) => (f.value)(v),
        (Some(v), None) => v.to_string(),
    };
    format!("{label}: {value}")
}

/// Fills templates with one data row
pub struct DocumentFiller {
    title: String,
}

impl DocumentFiller {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Override the header text
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The field lines drawn for a row, in mapping order
    pub fn lines(&self, row: &DataRow, mapping: &Mapping) -> Vec<String> {
        mapping
            .iter()
            .map(|entry| self.line_for(row, entry))
            .collect()
    }

    fn line_for(&self, row: &DataRow, entry: &MappingEntry) -> String {
        let value = resolve_text(row, &entry.key);
        format_field_line(entry.field_name(), value.as_deref())
    }

    /// Fill a template with a row and return the new PDF bytes
    pub fn fill(&self, template_bytes: &[u8], row: &DataRow, mapping: &Mapping) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::open_from_bytes(template_bytes)?;
        self.render(&mut doc, row, mapping)?;
        Ok(doc.to_bytes()?)
    }

    /// Draw the header and field lines onto the first page
    pub fn render(&self, doc: &mut PdfDocument, row: &DataRow, mapping: &Mapping) -> Result<()> {
        doc.set_font(StandardFont::HelveticaBold, TITLE_SIZE);
        doc.set_text_color(title_color());
        doc.insert_text(&self.title, PAGE, MARGIN_LEFT, TITLE_Y, Align::Left)?;

        doc.set_font(StandardFont::Helvetica, BODY_SIZE);
        doc.set_text_color(Color::black());
        let mut y = FIRST_LINE_Y;
        for line in self.lines(row, mapping) {
            for wrapped in simple_word_wrap(&line, WRAP_CHARS) {
                doc.insert_text(&wrapped, PAGE, MARGIN_LEFT, y, Align::Left)?;
                y += LINE_HEIGHT;
            }
        }

        debug!("rendered {} mapped fields", mapping.len());
        Ok(())
    }
}

impl Default for DocumentFiller {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill a template with one row using the default header
pub fn generate_filled_pdf(
    template_bytes: &[u8],
    row: &DataRow,
    mapping: &Mapping,
) -> Result<Vec<u8>> {
    DocumentFiller::new().fill(template_bytes, row, mapping)
}
