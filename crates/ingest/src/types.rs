//! The document model shared by every stage of the cache.
use serde::{Deserialize, Serialize};

/// A prepared document: its id, when it was added and its whitespace tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Integer timestamp (unix seconds in the reference datastore).
    pub date_added: i64,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, date_added: i64, tokens: Vec<String>) -> Self {
        Self {
            id: id.into(),
            date_added,
            tokens,
        }
    }

    /// Build a document by splitting `text` on whitespace.
    pub fn from_text(id: impl Into<String>, date_added: i64, text: &str) -> Self {
        Self::new(id, date_added, tokenize(text).collect())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Whitespace tokenization used for every text field.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|tok| tok.trim().to_string())
}
