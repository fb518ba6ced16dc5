//! LSH Cache Ingest Layer
//!
//! This is where documents enter the cache. Datastore rows (JSON objects) are
//! turned into [`Document`]s: an id, the integer timestamp the row was added,
//! and the whitespace tokens of the configured text fields.
//!
//! ## What we do here
//!
//! - **Prepare rows** - [`prepare_record`] reads the id (string or integer)
//!   and timestamp, then concatenates the tokens of each text field in
//!   [`IngestConfig::text_fields`] order. Missing text fields are logged, not
//!   fatal; a missing id or timestamp is an [`IngestError`].
//! - **Serve documents** - the [`DocumentSource`] trait gives the sweep its
//!   new documents (`documents_since`, oldest first) and the matcher its
//!   candidate texts (`fetch`, most recent first).
//! - **Read JSON Lines** - [`JsonlSource`] loads one row per line and skips
//!   malformed rows with a warning.
//!
//! ## Example
//!
//! ```
//! use ingest::{prepare_record, DocumentSource, IngestConfig, MemorySource};
//! use serde_json::json;
//!
//! let cfg = IngestConfig::default();
//! let row = json!({"_id": "r1", "DateAdded": 10, "Title": "lipstick on a pig"});
//! let doc = prepare_record(&row, &cfg).unwrap();
//! assert_eq!(doc.tokens, vec!["lipstick", "on", "a", "pig"]);
//!
//! let source: MemorySource = [doc].into_iter().collect();
//! assert_eq!(source.documents_since(0).unwrap().len(), 1);
//! assert!(source.documents_since(10).unwrap().is_empty());
//! ```

mod config;
mod error;
mod record;
mod source;
mod types;

pub use crate::config::IngestConfig;
pub use crate::error::IngestError;
pub use crate::record::prepare_record;
pub use crate::source::{DocumentSource, JsonlSource, MemorySource};
pub use crate::types::{tokenize, Document};
