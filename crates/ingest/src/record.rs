//! Row preparation: JSON datastore row to [`Document`].
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::types::{tokenize, Document};

/// Prepare a datastore row.
///
/// The id may be a string or an integer; the timestamp must be an integer.
/// Tokens of every configured text field are concatenated in field order.
/// A missing, `null` or empty text field is logged and contributes nothing.
pub fn prepare_record(row: &Value, cfg: &IngestConfig) -> Result<Document, IngestError> {
    let obj = row
        .as_object()
        .ok_or_else(|| IngestError::InvalidRecord(format!("expected object, got {}", kind(row))))?;

    let id = read_id(obj, &cfg.id_field)?;
    let date_added = read_timestamp(obj, &cfg.date_field)?;

    let mut tokens = Vec::new();
    for field in &cfg.text_fields {
        match obj.get(field) {
            Some(Value::String(text)) if !text.trim().is_empty() => tokens.extend(tokenize(text)),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                warn!(id = %id, field = %field, "missing_text_field");
            }
            Some(other) => {
                return Err(IngestError::invalid_field(
                    field,
                    format!("expected string, got {}", kind(other)),
                ));
            }
        }
    }

    Ok(Document::new(id, date_added, tokens))
}

fn read_id(obj: &Map<String, Value>, field: &str) -> Result<String, IngestError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(IngestError::MissingField(field.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(IngestError::invalid_field(field, "id is empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(other) => Err(IngestError::invalid_field(
            field,
            format!("expected string or integer, got {}", kind(other)),
        )),
    }
}

fn read_timestamp(obj: &Map<String, Value>, field: &str) -> Result<i64, IngestError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(IngestError::MissingField(field.to_string())),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            IngestError::invalid_field(field, format!("{n} is not an i64 timestamp"))
        }),
        Some(other) => Err(IngestError::invalid_field(
            field,
            format!("expected integer, got {}", kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn concatenates_fields_in_configured_order() {
        let row = json!({
            "_id": "r1",
            "DateAdded": 1_400_000_000,
            "ExtendedContent": "still a pig",
            "Title": "lipstick  on a pig",
            "URL": "http://example.com/pig",
        });
        let doc = prepare_record(&row, &IngestConfig::default()).unwrap();
        assert_eq!(doc.id, "r1");
        assert_eq!(doc.date_added, 1_400_000_000);
        assert_eq!(
            doc.tokens,
            vec!["http://example.com/pig", "lipstick", "on", "a", "pig", "still", "a", "pig"]
        );
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let row = json!({"_id": 42, "DateAdded": 1, "Content": "x"});
        let doc = prepare_record(&row, &IngestConfig::default()).unwrap();
        assert_eq!(doc.id, "42");
    }

    #[test]
    fn missing_text_fields_yield_empty_document() {
        let row = json!({"_id": "r2", "DateAdded": 5, "Content": "   ", "Title": null});
        let doc = prepare_record(&row, &IngestConfig::default()).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn missing_id_or_timestamp_is_an_error() {
        let cfg = IngestConfig::default();
        assert_eq!(
            prepare_record(&json!({"DateAdded": 1}), &cfg).unwrap_err(),
            IngestError::MissingField("_id".into())
        );
        assert_eq!(
            prepare_record(&json!({"_id": "a", "DateAdded": null}), &cfg).unwrap_err(),
            IngestError::MissingField("DateAdded".into())
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let cfg = IngestConfig::default();
        let err = prepare_record(&json!({"_id": "a", "DateAdded": 1.5}), &cfg).unwrap_err();
        assert!(matches!(err, IngestError::InvalidField { ref field, .. } if field == "DateAdded"));

        let err = prepare_record(&json!({"_id": "", "DateAdded": 1}), &cfg).unwrap_err();
        assert!(matches!(err, IngestError::InvalidField { .. }));

        let err =
            prepare_record(&json!({"_id": "a", "DateAdded": 1, "Title": ["x"]}), &cfg).unwrap_err();
        assert!(err.to_string().contains("expected string, got array"));

        let err = prepare_record(&json!([1, 2]), &cfg).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRecord(_)));
    }

    #[test]
    fn custom_field_names() {
        let cfg = IngestConfig::default()
            .with_id_field("key")
            .with_date_field("ts")
            .with_text_fields(["body"]);
        let doc = prepare_record(&json!({"key": "k", "ts": -3, "body": "a b"}), &cfg).unwrap();
        assert_eq!(doc, Document::new("k", -3, vec!["a".into(), "b".into()]));
    }
}
