//! Template JSON parsing and row value resolution

use crate::{Result, Template, TemplateError};
use fr_text::{eq_ignore_case, fold_key};

/// One imported data row: column header -> cell value
pub type DataRow = serde_json::Map<String, serde_json::Value>;

/// Parse a template from JSON string
pub fn parse_template(json: &str) -> Result<Template> {
    serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))
}

/// Resolve a field against a data row
///
/// Tries the exact key, then a case-insensitive key, then an
/// accent-insensitive key; the first matching column in row order wins.
pub fn resolve_field<'a>(row: &'a DataRow, field: &str) -> Option<&'a serde_json::Value> {
    if let Some(value) = row.get(field) {
        return Some(value);
    }
    if let Some((_, value)) = row.iter().find(|(k, _)| eq_ignore_case(k, field)) {
        return Some(value);
    }
    let folded = fold_key(field);
    row.iter()
        .find(|(k, _)| fold_key(k) == folded)
        .map(|(_, v)| v)
}

/// Resolve a field and render it as text, `None` when absent or blank
pub fn resolve_text(row: &DataRow, field: &str) -> Option<String> {
    resolve_field(row, field)
        .map(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Convert a JSON value to string for rendering
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> DataRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_exact_field() {
        let data = row(json!({ "SOCIETE": "ACME", "societe": "other" }));
        assert_eq!(resolve_field(&data, "SOCIETE"), Some(&json!("ACME")));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let data = row(json!({ "societe": "ACME" }));
        assert_eq!(resolve_field(&data, "SOCIETE"), Some(&json!("ACME")));
    }

    #[test]
    fn test_resolve_accent_insensitive() {
        let data = row(json!({ "Société": "ACME" }));
        assert_eq!(resolve_field(&data, "SOCIETE"), Some(&json!("ACME")));
    }

    #[test]
    fn test_resolve_missing_field() {
        let data = row(json!({ "name": "John" }));
        assert_eq!(resolve_field(&data, "E Mail 2"), None);
    }

    #[test]
    fn test_resolve_text_blank_is_none() {
        let data = row(json!({ "VILLE": "  ", "CP": null, "MONTANT": 150 }));
        assert_eq!(resolve_text(&data, "VILLE"), None);
        assert_eq!(resolve_text(&data, "CP"), None);
        assert_eq!(resolve_text(&data, "MONTANT"), Some("150".to_string()));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
    }

    #[test]
    fn test_parse_template() {
        let json = r#"{
            "id": "t1",
            "name": "Facture",
            "type": "facture",
            "mappingFields": ["SOCIETE"],
            "createdAt": "2025-01-22T10:00:00Z"
        }"#;

        let template = parse_template(json).unwrap();
        assert_eq!(template.id, "t1");
        assert_eq!(template.mapping_fields, vec!["SOCIETE"]);
    }

    #[test]
    fn test_parse_template_invalid() {
        assert!(matches!(
            parse_template("{\"id\": 1}"),
            Err(TemplateError::ParseError(_))
        ));
    }
}
