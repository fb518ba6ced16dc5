//! Configuration for turning datastore rows into [`Document`](crate::Document)s.
//!
//! The defaults match the report collection the cache was first built for:
//! rows keyed by `_id`, stamped with an integer `DateAdded`, whose text lives
//! in `URL`, `Title`, `Content` and `ExtendedContent`.
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default().with_text_fields(["Title", "Body"]);
//! config.validate().expect("valid config");
//! assert_eq!(config.text_fields, vec!["Title", "Body"]);
//! ```
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Field names used by [`prepare_record`](crate::prepare_record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Field holding the document id (string or integer).
    ///
    /// Default: `"_id"`
    pub id_field: String,

    /// Field holding the integer timestamp the document was added.
    ///
    /// Default: `"DateAdded"`
    pub date_field: String,

    /// Text fields whose tokens are concatenated, in this order.
    ///
    /// Default: `["URL", "Title", "Content", "ExtendedContent"]`
    pub text_fields: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            id_field: "_id".to_string(),
            date_field: "DateAdded".to_string(),
            text_fields: ["URL", "Title", "Content", "ExtendedContent"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl IngestConfig {
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = field.into();
        self
    }

    pub fn with_text_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that every field name is non-empty and that at least one text
    /// field is configured.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.id_field.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "id_field must not be empty".into(),
            ));
        }
        if self.date_field.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "date_field must not be empty".into(),
            ));
        }
        if self.text_fields.is_empty() {
            return Err(IngestError::InvalidConfig(
                "at least one text field is required".into(),
            ));
        }
        if let Some(pos) = self.text_fields.iter().position(|f| f.trim().is_empty()) {
            return Err(IngestError::InvalidConfig(format!(
                "text_fields[{pos}] must not be empty"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = IngestConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.id_field, "_id");
        assert_eq!(cfg.date_field, "DateAdded");
        assert_eq!(cfg.text_fields.len(), 4);
    }

    #[test]
    fn empty_field_names_are_rejected() {
        let err = IngestConfig::default().with_id_field(" ").validate().unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfig(_)));

        let none: [&str; 0] = [];
        let err = IngestConfig::default().with_text_fields(none).validate().unwrap_err();
        assert!(err.to_string().contains("at least one"));

        let err = IngestConfig::default()
            .with_text_fields(["Title", ""])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("text_fields[1]"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: IngestConfig = serde_json::from_str(r#"{"text_fields": ["Body"]}"#).unwrap();
        assert_eq!(cfg.id_field, "_id");
        assert_eq!(cfg.text_fields, vec!["Body"]);
    }
}
