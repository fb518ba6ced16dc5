//! Error types produced by the ingest crate.
//!
//! Record-level problems ([`MissingField`](IngestError::MissingField),
//! [`InvalidField`](IngestError::InvalidField),
//! [`InvalidRecord`](IngestError::InvalidRecord)) describe a single row and
//! are usually logged and skipped by the caller. [`Io`](IngestError::Io) and
//! [`InvalidConfig`](IngestError::InvalidConfig) abort the whole read.
//!
//! ```rust
//! use ingest::IngestError;
//!
//! let err = IngestError::MissingField("DateAdded".into());
//! assert_eq!(err.to_string(), "record is missing required field `DateAdded`");
//! ```
use thiserror::Error;

/// Errors that can occur while preparing records or reading a document source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The id or timestamp field is absent (or `null`).
    #[error("record is missing required field `{0}`")]
    MissingField(String),

    /// A field is present but has the wrong shape, e.g. a fractional timestamp
    /// or an object where text was expected.
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    /// The row is not a JSON object, or is not valid JSON at all.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Reading the underlying file failed.
    #[error("io error: {0}")]
    Io(String),

    /// The ingest configuration failed validation.
    #[error("invalid ingest config: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err.to_string())
    }
}

impl IngestError {
    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        IngestError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
