//! Per-band bucket tables.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::bands::BandLayout;
use crate::{DocId, IndexError};

/// `b` tables mapping a band hash to the ids that landed there, oldest first.
///
/// An id appears at most once in any single bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketIndex<I> {
    layout: BandLayout,
    tables: Vec<HashMap<u64, Vec<I>>>,
}

impl<I: DocId> BucketIndex<I> {
    pub fn new(layout: BandLayout) -> Self {
        Self {
            layout,
            tables: (0..layout.bands()).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn layout(&self) -> BandLayout {
        self.layout
    }

    /// Current contents of the bucket `signature` falls into, per band.
    ///
    /// Unseen buckets yield empty lists. Never mutates.
    pub fn lookup(&self, signature: &[u64]) -> Result<Vec<Vec<I>>, IndexError> {
        let keys = self.layout.band_hashes(signature)?;
        Ok(keys
            .iter()
            .zip(&self.tables)
            .map(|(key, table)| table.get(key).cloned().unwrap_or_default())
            .collect())
    }

    /// Add `id` to its bucket in every band and return each bucket's
    /// contents as they were before the insert, without `id` itself.
    pub fn insert(&mut self, signature: &[u64], id: &I) -> Result<Vec<Vec<I>>, IndexError> {
        let keys = self.layout.band_hashes(signature)?;
        let mut candidates: Vec<Vec<I>> = Vec::with_capacity(keys.len());
        for (key, table) in keys.into_iter().zip(self.tables.iter_mut()) {
            let bucket = table.entry(key).or_default();
            candidates.push(bucket.iter().filter(|other| *other != id).cloned().collect());
            if !bucket.contains(id) {
                bucket.push(id.clone());
            }
        }
        Ok(candidates)
    }

    /// Number of non-empty buckets in each table.
    pub fn bucket_counts(&self) -> Vec<usize> {
        self.tables.iter().map(HashMap::len).collect()
    }

    /// Number of non-empty buckets across all tables.
    pub fn bucket_count(&self) -> usize {
        self.tables.iter().map(HashMap::len).sum()
    }

    /// Check table count and the at-most-once-per-bucket invariant.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.tables.len() != self.layout.bands() {
            return Err(IndexError::Corrupt(format!(
                "{} bucket tables for {} bands",
                self.tables.len(),
                self.layout.bands()
            )));
        }
        for (band, table) in self.tables.iter().enumerate() {
            for bucket in table.values() {
                let mut unique = HashSet::with_capacity(bucket.len());
                if !bucket.iter().all(|id| unique.insert(id)) {
                    return Err(IndexError::Corrupt(format!(
                        "duplicate id in a bucket of band {band}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Union of per-band candidate lists in first-seen order, without `exclude`.
pub fn flatten_candidates<I: DocId>(buckets: &[Vec<I>], exclude: &I) -> Vec<I> {
    let mut seen = HashSet::new();
    let mut flat = Vec::new();
    for id in buckets.iter().flatten() {
        if id != exclude && seen.insert(id) {
            flat.push(id.clone());
        }
    }
    flat
}
