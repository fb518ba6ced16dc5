//! Fingerprint and metadata types produced by the perceptual layer.

use serde::{Deserialize, Serialize};

/// MinHash fingerprint of one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualFingerprint {
    /// MinHash signature, one component per hash function.
    pub minhash: Vec<u64>,
    /// How, and against which vocabulary state, the signature was computed.
    pub meta: PerceptualMeta,
}

/// Metadata for traceability and determinism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualMeta {
    pub perceptual_version: u16,
    pub algorithm_name: String,
    /// Signature length (number of hash functions).
    pub num_perm: usize,
    pub min_shingle: usize,
    pub max_shingle: usize,
    /// Modulus the hash functions reduced into.
    ///
    /// Under the vocabulary policy this is the vocabulary size after the
    /// document's shingles were interned; signatures with different moduli
    /// are only approximately comparable.
    pub modulus: u64,
    /// Number of distinct shingles in the document.
    pub shingle_count: usize,
    pub use_parallel: bool,
}
