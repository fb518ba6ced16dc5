//! Workspace umbrella crate for the LSH near-duplicate cache.
//!
//! This crate stitches the member crates into a runnable pipeline: documents
//! come from an [`ingest::DocumentSource`], are looked up and inserted in an
//! [`index::LshCache`], and their LSH candidates are confirmed by a
//! [`matcher::DuplicateFilter`]. [`Deduplicator::sweep`] drives one batch;
//! [`worker::spawn_worker`] serves a cache to concurrent callers.

mod config;
mod pipeline;
mod report;
pub mod worker;

use std::error::Error;
use std::fmt;

pub use index::{
    load_cache, save_cache, CacheConfig, CheckOutcome, CompressionCodec, CompressionConfig,
    FileStore, InMemoryStore, IndexError, InsertOutcome, LshCache, SnapshotStore,
};
pub use ingest::{
    prepare_record, Document, DocumentSource, IngestConfig, IngestError, JsonlSource,
    MemorySource,
};
pub use matcher::{Confirmation, DuplicateFilter, MatchConfig, MatchError, MatchPolicy};
pub use perceptual::ModulusPolicy;

pub use crate::config::{ConfigLoadError, LshConfig, SnapshotConfig};
pub use crate::pipeline::{Deduplicator, DocumentOutcome, SourceLookup};
pub use crate::report::{DuplicatePair, SweepReport};

/// Errors that can occur while running documents through the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Index(IndexError),
    Match(MatchError),
    Ingest(IngestError),
    /// The worker task has stopped and can no longer answer requests.
    WorkerClosed,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Index(err) => write!(f, "cache failure: {err}"),
            PipelineError::Match(err) => write!(f, "confirmation failure: {err}"),
            PipelineError::Ingest(err) => write!(f, "document source failure: {err}"),
            PipelineError::WorkerClosed => write!(f, "cache worker is no longer running"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Index(err) => Some(err),
            PipelineError::Match(err) => Some(err),
            PipelineError::Ingest(err) => Some(err),
            PipelineError::WorkerClosed => None,
        }
    }
}

impl From<IndexError> for PipelineError {
    fn from(value: IndexError) -> Self {
        PipelineError::Index(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}
