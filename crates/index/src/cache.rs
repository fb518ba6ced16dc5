//! Cache State: the perceptual layer, the bucket tables and the bookkeeping
//! that ties documents to them.

use hashbrown::HashSet;
use perceptual::{ModulusPolicy, PerceptualConfig, Perceptualizer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bands::BandLayout;
use crate::buckets::{flatten_candidates, BucketIndex};
use crate::{DocId, IndexError};

/// Signature length, banding and shingling parameters of one cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Signature length `n`.
    #[serde(alias = "n")]
    pub num_perm: usize,
    /// Number of bands `b`.
    #[serde(alias = "b")]
    pub bands: usize,
    /// Rows per band `r`.
    #[serde(alias = "r")]
    pub rows: usize,
    pub max_shingle: usize,
    pub min_shingle: usize,
    pub modulus: ModulusPolicy,
    pub use_parallel: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_perm: 100,
            bands: 20,
            rows: 5,
            max_shingle: 3,
            min_shingle: 0,
            modulus: ModulusPolicy::Vocabulary,
            use_parallel: false,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `n`, `b` and `r` together; they are only valid as a triple.
    pub fn with_layout(mut self, num_perm: usize, bands: usize, rows: usize) -> Self {
        self.num_perm = num_perm;
        self.bands = bands;
        self.rows = rows;
        self
    }

    pub fn with_max_shingle(mut self, max_shingle: usize) -> Self {
        self.max_shingle = max_shingle;
        self
    }

    pub fn with_min_shingle(mut self, min_shingle: usize) -> Self {
        self.min_shingle = min_shingle;
        self
    }

    pub fn with_modulus(mut self, modulus: ModulusPolicy) -> Self {
        self.modulus = modulus;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// The perceptual-layer view of this configuration.
    pub fn perceptual(&self) -> PerceptualConfig {
        PerceptualConfig::new()
            .with_num_perm(self.num_perm)
            .with_max_shingle(self.max_shingle)
            .with_min_shingle(self.min_shingle)
            .with_modulus(self.modulus)
            .with_parallel(self.use_parallel)
    }

    pub fn layout(&self) -> Result<BandLayout, IndexError> {
        BandLayout::new(self.bands, self.rows, self.num_perm)
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        self.perceptual().validate()?;
        self.layout()?;
        Ok(())
    }
}

/// Result of a read-only probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome<I> {
    /// The id was inserted before; nothing was computed.
    AlreadySeen,
    /// Zero tokens; nothing was computed.
    EmptyDocument,
    /// Bucket contents per band.
    Candidates(Vec<Vec<I>>),
}

impl<I: DocId> CheckOutcome<I> {
    pub fn per_band(&self) -> Option<&[Vec<I>]> {
        match self {
            CheckOutcome::Candidates(buckets) => Some(buckets.as_slice()),
            _ => None,
        }
    }

    /// Deduplicated union of all bands, without `exclude`.
    pub fn flatten(&self, exclude: &I) -> Vec<I> {
        self.per_band()
            .map(|buckets| flatten_candidates(buckets, exclude))
            .unwrap_or_default()
    }
}

/// Result of an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<I> {
    AlreadySeen,
    EmptyDocument,
    /// Indexed; carries the deduplicated pre-insertion candidates.
    Inserted(Vec<I>),
}

impl<I> InsertOutcome<I> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    pub fn candidates(&self) -> &[I] {
        match self {
            InsertOutcome::Inserted(candidates) => candidates.as_slice(),
            _ => &[],
        }
    }
}

/// An LSH near-duplicate cache over documents identified by `I`.
///
/// Vocabulary, hash bank, bucket tables and bookkeeping are one value and
/// are persisted together; see [`crate::snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(
    serialize = "I: DocId + Serialize",
    deserialize = "I: DocId + Deserialize<'de>"
))]
pub struct LshCache<I: DocId> {
    config: CacheConfig,
    hasher: Perceptualizer,
    buckets: BucketIndex<I>,
    seen: HashSet<I>,
    num_docs: u64,
    most_recent_insert: i64,
}

impl<I: DocId> LshCache<I> {
    /// Build an empty cache. Fails on an inconsistent layout.
    pub fn new(config: CacheConfig) -> Result<Self, IndexError> {
        let layout = config.layout()?;
        let hasher = Perceptualizer::new(config.perceptual())?;
        Ok(Self {
            config,
            hasher,
            buckets: BucketIndex::new(layout),
            seen: HashSet::new(),
            num_docs: 0,
            most_recent_insert: 0,
        })
    }

    /// Per-band candidates for `tokens` without touching the bucket tables
    /// or the seen set.
    ///
    /// New shingles are still interned, so the vocabulary may grow.
    pub fn check<S: AsRef<str>>(
        &mut self,
        id: &I,
        tokens: &[S],
    ) -> Result<CheckOutcome<I>, IndexError> {
        self.process(id, tokens, 0, true)
    }

    /// Index `tokens` under `id` and return the deduplicated candidates
    /// that shared at least one bucket before the insert.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        id: &I,
        tokens: &[S],
        date_added: i64,
    ) -> Result<InsertOutcome<I>, IndexError> {
        Ok(match self.process(id, tokens, date_added, false)? {
            CheckOutcome::AlreadySeen => InsertOutcome::AlreadySeen,
            CheckOutcome::EmptyDocument => InsertOutcome::EmptyDocument,
            CheckOutcome::Candidates(buckets) => {
                InsertOutcome::Inserted(flatten_candidates(&buckets, id))
            }
        })
    }

    /// Look up the per-band candidates and, unless `passive`, insert.
    ///
    /// The returned lists are the pre-insertion view either way.
    pub fn process<S: AsRef<str>>(
        &mut self,
        id: &I,
        tokens: &[S],
        date_added: i64,
        passive: bool,
    ) -> Result<CheckOutcome<I>, IndexError> {
        if self.seen.contains(id) {
            return Ok(CheckOutcome::AlreadySeen);
        }
        if tokens.is_empty() {
            return Ok(CheckOutcome::EmptyDocument);
        }

        let fingerprint = self.hasher.perceptualize(tokens);
        debug!(
            doc_id = ?id,
            tokens = tokens.len(),
            shingles = fingerprint.meta.shingle_count,
            modulus = fingerprint.meta.modulus,
            "minhash_signature"
        );

        let buckets = if passive {
            self.buckets.lookup(&fingerprint.minhash)?
        } else {
            let buckets = self.buckets.insert(&fingerprint.minhash, id)?;
            self.seen.insert(id.clone());
            self.num_docs += 1;
            if date_added > self.most_recent_insert {
                self.most_recent_insert = date_added;
            }
            buckets
        };
        Ok(CheckOutcome::Candidates(buckets))
    }

    pub fn contains(&self, id: &I) -> bool {
        self.seen.contains(id)
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Largest `date_added` of any inserted document; 0 for a new cache.
    pub fn most_recent_insert(&self) -> i64 {
        self.most_recent_insert
    }

    /// Size of the shingle vocabulary.
    pub fn num_shingles(&self) -> usize {
        self.hasher.vocabulary().len()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn hasher(&self) -> &Perceptualizer {
        &self.hasher
    }

    pub fn buckets(&self) -> &BucketIndex<I> {
        &self.buckets
    }

    /// Check a restored cache for internal consistency.
    pub fn validate(&self) -> Result<(), IndexError> {
        self.config.validate()?;
        if self.hasher.config() != &self.config.perceptual() {
            return Err(IndexError::Corrupt(
                "perceptual configuration does not match cache configuration".into(),
            ));
        }
        self.hasher.validate()?;
        if self.buckets.layout() != self.config.layout()? {
            return Err(IndexError::Corrupt(
                "bucket layout does not match cache configuration".into(),
            ));
        }
        self.buckets.validate()?;
        if self.num_docs != self.seen.len() as u64 {
            return Err(IndexError::Corrupt(format!(
                "num_docs {} but {} seen ids",
                self.num_docs,
                self.seen.len()
            )));
        }
        Ok(())
    }
}
