//! The sweep driver: read new documents, look them up in the cache, confirm
//! candidates against the source and report duplicates.

use index::{CheckOutcome, LshCache};
use ingest::{Document, DocumentSource};
use matcher::{Confirmation, DuplicateFilter, MatchError, TokenLookup};
use tracing::{debug, info, info_span, warn};

use crate::config::LshConfig;
use crate::report::{DuplicatePair, SweepReport};
use crate::PipelineError;

const PROGRESS_EVERY: usize = 100;

/// Candidate token lookup backed by a [`DocumentSource`].
///
/// Candidates come back most recent first.
pub struct SourceLookup<'a, S: ?Sized>(pub &'a S);

impl<S: DocumentSource + ?Sized> TokenLookup<String> for SourceLookup<'_, S> {
    fn fetch_tokens(&self, ids: &[String]) -> Result<Vec<(String, Vec<String>)>, MatchError> {
        let docs = self
            .0
            .fetch(ids)
            .map_err(|err| MatchError::Lookup(err.to_string()))?;
        Ok(docs.into_iter().map(|doc| (doc.id, doc.tokens)).collect())
    }
}

/// What happened to one document during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    AlreadySeen,
    EmptyDocument,
    Unique,
    Duplicate(Confirmation<String>),
}

/// Owns a cache and runs documents from `source` through it.
pub struct Deduplicator<S> {
    cache: LshCache<String>,
    filter: DuplicateFilter,
    source: S,
    passive: bool,
}

impl<S: DocumentSource> Deduplicator<S> {
    pub fn new(cache: LshCache<String>, filter: DuplicateFilter, source: S) -> Self {
        Self {
            cache,
            filter,
            source,
            passive: false,
        }
    }

    /// A fresh cache and filter built from `cfg`.
    pub fn from_config(cfg: &LshConfig, source: S) -> Result<Self, PipelineError> {
        let cache = LshCache::new(cfg.cache.clone())?;
        let filter = DuplicateFilter::new(cfg.matcher.clone())?;
        Ok(Self::new(cache, filter, source).with_passive(cfg.passive))
    }

    /// In passive mode documents are checked but never inserted.
    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    pub fn is_passive(&self) -> bool {
        self.passive
    }

    pub fn cache(&self) -> &LshCache<String> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn filter(&self) -> &DuplicateFilter {
        &self.filter
    }

    pub fn into_cache(self) -> LshCache<String> {
        self.cache
    }

    /// Run every document added after `start` through the cache.
    ///
    /// Without `start` the sweep resumes after the cache's most recent
    /// insert, so repeated sweeps only see new documents.
    pub fn sweep(&mut self, start: Option<i64>) -> Result<SweepReport, PipelineError> {
        let since = start.unwrap_or_else(|| self.cache.most_recent_insert());
        let span = info_span!("sweep", since, passive = self.passive);
        let _guard = span.enter();

        let docs = self.source.documents_since(since)?;
        let total = docs.len();
        info!(total, "sweep_started");

        let mut report = SweepReport::default();
        for (i, doc) in docs.iter().enumerate() {
            if i % PROGRESS_EVERY == 0 {
                info!(processed = i, total, "sweep_progress");
            }
            report.processed += 1;

            match self.process_document(doc)? {
                DocumentOutcome::AlreadySeen => {
                    warn!(id = %doc.id, "document_already_seen");
                    report.skipped += 1;
                    continue;
                }
                DocumentOutcome::EmptyDocument => {
                    warn!(id = %doc.id, "empty_document");
                    report.skipped += 1;
                    continue;
                }
                DocumentOutcome::Unique => {}
                DocumentOutcome::Duplicate(found) => {
                    let recorded = !self.passive;
                    info!(
                        id = %doc.id,
                        duplicate_of = %found.id,
                        jaccard = found.jaccard,
                        edit_rate = found.edit_rate,
                        recorded,
                        "duplicate_found"
                    );
                    report.duplicates.push(DuplicatePair {
                        id: doc.id.clone(),
                        duplicate_of: found.id,
                        jaccard: found.jaccard,
                        edit_rate: found.edit_rate,
                        recorded,
                    });
                }
            }
            if !self.passive {
                report.inserted += 1;
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            inserted = report.inserted,
            duplicates = report.duplicates.len(),
            num_docs = self.cache.num_docs(),
            "sweep_complete"
        );
        Ok(report)
    }

    /// Look up one document, insert it unless passive, and confirm its
    /// candidates.
    pub fn process_document(&mut self, doc: &Document) -> Result<DocumentOutcome, PipelineError> {
        let outcome = self
            .cache
            .process(&doc.id, &doc.tokens, doc.date_added, self.passive)?;
        let candidates = match outcome {
            CheckOutcome::AlreadySeen => return Ok(DocumentOutcome::AlreadySeen),
            CheckOutcome::EmptyDocument => return Ok(DocumentOutcome::EmptyDocument),
            CheckOutcome::Candidates(_) => outcome.flatten(&doc.id),
        };
        debug!(id = %doc.id, candidates = candidates.len(), "lsh_candidates");

        let found = self
            .filter
            .confirm(&doc.tokens, &candidates, &SourceLookup(&self.source))?;
        Ok(match found {
            Some(confirmation) => DocumentOutcome::Duplicate(confirmation),
            None => DocumentOutcome::Unique,
        })
    }
}
