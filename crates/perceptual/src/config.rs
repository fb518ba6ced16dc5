//! Configuration and error types for shingling and MinHash.
//!
//! The configuration is a plain value: it never touches I/O or the
//! environment, so the perceptual output is a function of the token stream,
//! the configuration and the vocabulary state it is computed against.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the hash functions reduce `x XOR mask` into a bounded range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModulusPolicy {
    /// Reduce modulo the vocabulary size at computation time.
    ///
    /// The vocabulary keeps growing over the life of an index, so the same
    /// shingle id hashes to different values at different times. Signatures
    /// computed at different vocabulary sizes are only approximately
    /// comparable.
    #[default]
    Vocabulary,
    /// Reduce modulo a power-of-two ceiling frozen at construction.
    ///
    /// Signatures stay bitwise comparable for the whole life of the index.
    Fixed(u64),
}

/// Configuration for shingle extraction and MinHash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualConfig {
    /// Number of hash functions, i.e. the signature length `n`.
    pub num_perm: usize,
    /// Exclusive upper bound on shingle length (in tokens).
    pub max_shingle: usize,
    /// Inclusive lower bound on shingle length.
    ///
    /// `0` keeps the zero-length window, which collapses to a single shared
    /// shingle per document and carries no discriminative signal. `1` drops
    /// it.
    #[serde(default)]
    pub min_shingle: usize,
    /// Modulus used by the hash bank.
    #[serde(default)]
    pub modulus: ModulusPolicy,
    /// Evaluate hash functions in parallel with rayon.
    #[serde(default)]
    pub use_parallel: bool,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signature length `n`.
    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    /// Set the exclusive maximum shingle length.
    pub fn with_max_shingle(mut self, max_shingle: usize) -> Self {
        self.max_shingle = max_shingle;
        self
    }

    /// Set the inclusive minimum shingle length.
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

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.num_perm == 0 {
            return Err(PerceptualError::InvalidNumPerm {
                num_perm: self.num_perm,
            });
        }
        if self.max_shingle == 0 {
            return Err(PerceptualError::InvalidMaxShingle {
                max_shingle: self.max_shingle,
            });
        }
        if self.min_shingle >= self.max_shingle {
            return Err(PerceptualError::InvalidShingleRange {
                min_shingle: self.min_shingle,
                max_shingle: self.max_shingle,
            });
        }
        if let ModulusPolicy::Fixed(modulus) = self.modulus {
            if !modulus.is_power_of_two() {
                return Err(PerceptualError::InvalidModulus { modulus });
            }
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            num_perm: 100,
            max_shingle: 3,
            min_shingle: 0,
            modulus: ModulusPolicy::Vocabulary,
            use_parallel: false,
        }
    }
}

/// Errors returned by the perceptual layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: num_perm must be >= 1 (got {num_perm})")]
    InvalidNumPerm { num_perm: usize },

    #[error("invalid config: max_shingle must be greater than 0 (got {max_shingle})")]
    InvalidMaxShingle { max_shingle: usize },

    #[error("invalid config: min_shingle ({min_shingle}) must be below max_shingle ({max_shingle})")]
    InvalidShingleRange {
        min_shingle: usize,
        max_shingle: usize,
    },

    #[error("invalid config: fixed modulus must be a non-zero power of two (got {modulus})")]
    InvalidModulus { modulus: u64 },

    #[error("hash bank has {actual} masks but the config asks for {expected}")]
    BankSizeMismatch { expected: usize, actual: usize },

    #[error("inconsistent vocabulary: {0}")]
    InconsistentVocabulary(String),
}
