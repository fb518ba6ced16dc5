//! Results of a sweep.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A document confirmed as a near-duplicate of an earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub id: String,
    pub duplicate_of: String,
    pub jaccard: f64,
    pub edit_rate: f64,
    /// `false` in passive runs, where the pair is reported but nothing is
    /// written back.
    pub recorded: bool,
}

/// Counters and confirmed duplicates from one [`sweep`](crate::Deduplicator::sweep).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Documents read from the source.
    pub processed: usize,
    /// Empty or already-seen documents.
    pub skipped: usize,
    /// Documents added to the cache (always 0 in passive mode).
    pub inserted: usize,
    pub duplicates: Vec<DuplicatePair>,
}

impl SweepReport {
    /// Mean Jaccard score of the confirmed duplicates.
    pub fn mean_score(&self) -> Option<f64> {
        if self.duplicates.is_empty() {
            return None;
        }
        let total: f64 = self.duplicates.iter().map(|pair| pair.jaccard).sum();
        Some(total / self.duplicates.len() as f64)
    }

    /// Write `id<TAB>duplicate_of<TAB>score` lines.
    pub fn write_tsv<W: Write>(&self, mut out: W) -> io::Result<()> {
        for pair in &self.duplicates {
            writeln!(out, "{}\t{}\t{:.6}", pair.id, pair.duplicate_of, pair.jaccard)?;
        }
        out.flush()
    }

    pub fn save_tsv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.write_tsv(BufWriter::new(File::create(path)?))
    }
}
