//! Integration tests for mapping and filling

use pretty_assertions::assert_eq;
use serde_json::json;
use template::{
    auto_map_fields, default_template_bytes, generate_filled_pdf, DataRow, DocumentFiller,
    FieldCatalog, Mapping, TemplateError,
};

fn row(value: serde_json::Value) -> DataRow {
    value.as_object().cloned().unwrap()
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn first_page_content(bytes: &[u8]) -> String {
    let doc = lopdf::Document::load_mem(bytes).expect("Failed to re-open PDF");
    let page_id = doc.get_pages()[&1];
    let content = doc.get_page_content(page_id).expect("Missing page content");
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn test_fill_default_template() {
    let template = default_template_bytes().unwrap();
    let data = row(json!({
        "societe": "ACME",
        "VILLE": "Paris",
        "MONTANT": "150"
    }));
    let mapping = auto_map_fields(&template, &headers(&["societe", "VILLE", "MONTANT"]), &FieldCatalog::standard());

    let output = generate_filled_pdf(&template, &data, &mapping).unwrap();
    let content = first_page_content(&output);

    assert!(content.contains("(Appel de cotisation CPME) Tj"));
    assert!(content.contains("(Ville: Paris) Tj"));
    assert!(content.contains("(Montant: 150,00 \\200) Tj"));
    assert!(content.contains("(Soci\\351t\\351: ACME) Tj"));
}

#[test]
fn test_missing_value_renders_dash() {
    let template = default_template_bytes().unwrap();
    let data = row(json!({ "SOCIETE": "ACME" }));
    let mapping = auto_map_fields(&template, &headers(&["SOCIETE"]), &FieldCatalog::standard());

    let output = generate_filled_pdf(&template, &data, &mapping).unwrap();
    let content = first_page_content(&output);

    assert!(content.contains("(E Mail 2: -) Tj"));
}

#[test]
fn test_lines_in_catalog_order() {
    let mapping = auto_map_fields(b"", &headers(&["Ville", "societe"]), &FieldCatalog::standard());
    let data = row(json!({ "Ville": "Lyon", "societe": "ACME" }));

    let lines = DocumentFiller::new().lines(&data, &mapping);

    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], "Société: ACME");
    assert_eq!(lines[5], "Ville: Lyon");
    assert_eq!(lines[8], "E Mail 2: -");
}

#[test]
fn test_fill_keeps_single_page() {
    let template = default_template_bytes().unwrap();
    let output = generate_filled_pdf(&template, &DataRow::new(), &Mapping::new()).unwrap();

    let doc = lopdf::Document::load_mem(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_fill_invalid_template_fails() {
    let result = generate_filled_pdf(b"not a pdf", &DataRow::new(), &Mapping::new());
    assert!(matches!(result, Err(TemplateError::PdfError(_))));
}
