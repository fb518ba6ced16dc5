//! # LSH Cache Index
//!
//! Banded locality-sensitive hashing over MinHash signatures, plus the
//! bookkeeping and persistence that turn it into a near-duplicate cache.
//!
//! ## Core Features
//!
//! - **Band tables**: a signature of length `n` is cut into `b` bands of
//!   `r` rows ([`BandLayout`]); each band hashes into its own table of
//!   buckets ([`BucketIndex`]). Documents that agree on every row of at least
//!   one band become candidates for each other.
//! - **Cache State**: [`LshCache`] owns the perceptual layer, the bucket
//!   tables, the seen set, `num_docs` and `most_recent_insert`, and exposes
//!   `check`, `insert` and `process`.
//! - **Snapshots**: the whole cache is encoded with bincode, compressed
//!   with zstd and written through a pluggable [`SnapshotStore`]
//!   (in-memory or files with atomic replace).
//!
//! ## Example Usage
//!
//! ```
//! use index::{CacheConfig, InsertOutcome, LshCache};
//!
//! let mut cache: LshCache<u32> = LshCache::new(CacheConfig::default()).unwrap();
//!
//! let doc: Vec<&str> = "you can put lipstick on a pig".split_whitespace().collect();
//! cache.insert(&1, &doc, 1_700_000_000).unwrap();
//!
//! // The same text under a new id lands in the same buckets.
//! let outcome = cache.insert(&2, &doc, 1_700_000_100).unwrap();
//! assert_eq!(outcome, InsertOutcome::Inserted(vec![1]));
//! assert_eq!(cache.num_docs(), 2);
//! ```

mod backend;
pub mod bands;
pub mod buckets;
pub mod cache;
pub mod snapshot;

use std::fmt::Debug;
use std::hash::Hash;

use bincode::error::{DecodeError, EncodeError};
use perceptual::PerceptualError;
use thiserror::Error;

pub use crate::backend::{FileStore, InMemoryStore, SnapshotStore, SNAPSHOT_EXTENSION};
pub use crate::bands::{band_hash, BandLayout};
pub use crate::buckets::{flatten_candidates, BucketIndex};
pub use crate::cache::{CacheConfig, CheckOutcome, InsertOutcome, LshCache};
pub use crate::snapshot::{
    decode_snapshot, encode_snapshot, load_cache, save_cache, CompressionCodec,
    CompressionConfig, SNAPSHOT_MAGIC, SNAPSHOT_SCHEMA_VERSION,
};

/// Requirements on a document identifier.
pub trait DocId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> DocId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Custom error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid band layout: {bands} bands x {rows} rows != signature length {num_perm}")]
    InvalidBandLayout {
        bands: usize,
        rows: usize,
        num_perm: usize,
    },
    #[error("signature has {actual} components, expected {expected}")]
    SignatureLength { expected: usize, actual: usize },
    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
    #[error("Compression error: {0}")]
    Zstd(String),
    #[error("no snapshot stored under {0:?}")]
    NotFound(String),
    #[error("incompatible snapshot: {0}")]
    Incompatible(String),
    #[error("corrupt cache state: {0}")]
    Corrupt(String),
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
