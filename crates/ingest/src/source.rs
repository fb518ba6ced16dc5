//! Document sources: where the sweep reads new documents from and where the
//! matcher fetches candidate texts.
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::record::prepare_record;
use crate::types::Document;

/// Read access to a document store.
pub trait DocumentSource {
    /// Documents added strictly after `since`, oldest first.
    fn documents_since(&self, since: i64) -> Result<Vec<Document>, IngestError>;

    /// The documents with the given ids, most recently added first.
    ///
    /// Unknown ids are left out; repeated ids are returned once.
    fn fetch(&self, ids: &[String]) -> Result<Vec<Document>, IngestError>;
}

/// Documents held in memory, indexed by id.
///
/// Pushing a document whose id is already present replaces it.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, doc: Document) {
        match self.by_id.get(&doc.id) {
            Some(&slot) => self.docs[slot] = doc,
            None => {
                self.by_id.insert(doc.id.clone(), self.docs.len());
                self.docs.push(doc);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&slot| &self.docs[slot])
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }
}

impl FromIterator<Document> for MemorySource {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        let mut source = MemorySource::new();
        for doc in iter {
            source.push(doc);
        }
        source
    }
}

impl DocumentSource for MemorySource {
    fn documents_since(&self, since: i64) -> Result<Vec<Document>, IngestError> {
        let mut docs: Vec<Document> = self
            .docs
            .iter()
            .filter(|doc| doc.date_added > since)
            .cloned()
            .collect();
        docs.sort_by_key(|doc| doc.date_added);
        Ok(docs)
    }

    fn fetch(&self, ids: &[String]) -> Result<Vec<Document>, IngestError> {
        let mut wanted = HashSet::with_capacity(ids.len());
        let mut docs: Vec<Document> = ids
            .iter()
            .filter(|id| wanted.insert(*id))
            .filter_map(|id| self.get(id).cloned())
            .collect();
        docs.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(docs)
    }
}

/// A JSON Lines file, one datastore row per line.
///
/// The file is read once at open time. Blank lines are ignored; lines that
/// fail to parse or prepare are skipped with a warning and counted.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    inner: MemorySource,
    skipped: usize,
}

impl JsonlSource {
    pub fn open(path: impl AsRef<Path>, cfg: &IngestConfig) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| IngestError::Io(format!("{}: {err}", path.display())))?;
        let source = Self::from_reader(BufReader::new(file), cfg)?;
        info!(
            path = %path.display(),
            documents = source.len(),
            skipped = source.skipped(),
            "jsonl_source_loaded"
        );
        Ok(source)
    }

    pub fn from_reader<R: BufRead>(reader: R, cfg: &IngestConfig) -> Result<Self, IngestError> {
        cfg.validate()?;
        let mut inner = MemorySource::new();
        let mut skipped = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let prepared = serde_json::from_str::<serde_json::Value>(&line)
                .map_err(|err| IngestError::InvalidRecord(err.to_string()))
                .and_then(|row| prepare_record(&row, cfg));
            match prepared {
                Ok(doc) => inner.push(doc),
                Err(err) => {
                    skipped += 1;
                    warn!(line = idx + 1, error = %err, "skipping_malformed_row");
                }
            }
        }
        Ok(Self { inner, skipped })
    }

    /// Number of lines that could not be turned into documents.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.inner.get(id)
    }
}

impl DocumentSource for JsonlSource {
    fn documents_since(&self, since: i64) -> Result<Vec<Document>, IngestError> {
        self.inner.documents_since(since)
    }

    fn fetch(&self, ids: &[String]) -> Result<Vec<Document>, IngestError> {
        self.inner.fetch(ids)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn documents_since(&self, since: i64) -> Result<Vec<Document>, IngestError> {
        (**self).documents_since(since)
    }

    fn fetch(&self, ids: &[String]) -> Result<Vec<Document>, IngestError> {
        (**self).fetch(ids)
    }
}
