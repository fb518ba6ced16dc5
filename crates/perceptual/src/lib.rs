//! # LSH Cache Perceptual Layer
//!
//! Turns a token stream into a MinHash signature that approximates the
//! Jaccard similarity of the document's word-shingle sets.
//!
//! ## Core Pipeline
//!
//! 1.  **Shingling**: for every shingle length in `min_shingle..max_shingle`
//!     the token stream is padded with `<start>` sentinels and every window
//!     is interned into a [`ShingleVocabulary`], which hands out dense ids in
//!     first-seen order.
//!
//! 2.  **MinHashing**: a [`HashBank`] of `n` XOR masks approximates `n`
//!     random permutations of the id space. Component `i` of the signature
//!     is `min((id ^ mask_i) % modulus)` over the document's ids.
//!
//! The vocabulary is stateful and grows with every new document, so unlike
//! a pure function of `(tokens, config)` the output also depends on the
//! vocabulary the [`Perceptualizer`] has accumulated. With the default
//! [`ModulusPolicy::Vocabulary`] the modulus is the vocabulary size at
//! computation time.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{Perceptualizer, PerceptualConfig};
//!
//! let config = PerceptualConfig::default().with_num_perm(20);
//! let mut hasher = Perceptualizer::new(config).unwrap();
//!
//! let fingerprint = hasher.perceptualize(&["lipstick", "on", "a", "pig"]);
//!
//! assert_eq!(fingerprint.minhash.len(), 20);
//! assert_eq!(fingerprint.meta.modulus, hasher.vocabulary().len() as u64);
//! ```

pub mod config;
pub mod fingerprint;
mod hashbank;
mod minhash;
mod shingles;
mod vocab;

use serde::{Deserialize, Serialize};

pub use crate::config::{ModulusPolicy, PerceptualConfig, PerceptualError};
pub use crate::fingerprint::{PerceptualFingerprint, PerceptualMeta};
pub use crate::hashbank::HashBank;
pub use crate::minhash::{estimate_jaccard, minhash_signature, EMPTY_SLOT};
pub use crate::shingles::{shingle_ids, START_TOKEN};
pub use crate::vocab::ShingleVocabulary;

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "sentinel_shingle_xor_minhash_v1";

/// Stateful signature generator: configuration, vocabulary and hash bank.
///
/// The three parts are only meaningful together and are serialized as one
/// value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Perceptualizer {
    cfg: PerceptualConfig,
    vocab: ShingleVocabulary,
    bank: HashBank,
}

impl Perceptualizer {
    /// Validate `cfg` and build an empty vocabulary and a fresh hash bank.
    pub fn new(cfg: PerceptualConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        let bank = HashBank::new(cfg.num_perm);
        Ok(Self {
            cfg,
            vocab: ShingleVocabulary::new(),
            bank,
        })
    }

    pub fn config(&self) -> &PerceptualConfig {
        &self.cfg
    }

    pub fn vocabulary(&self) -> &ShingleVocabulary {
        &self.vocab
    }

    pub fn bank(&self) -> &HashBank {
        &self.bank
    }

    /// The modulus the hash bank reduces into right now.
    pub fn modulus(&self) -> u64 {
        match self.cfg.modulus {
            ModulusPolicy::Vocabulary => self.vocab.len() as u64,
            ModulusPolicy::Fixed(modulus) => modulus,
        }
    }

    /// Intern the document's shingles and return their id set.
    pub fn shingle_vector<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<u64> {
        shingle_ids(tokens, &self.cfg, &mut self.vocab)
    }

    /// Compute the fingerprint of `tokens`, growing the vocabulary with any
    /// shingle it has not seen before.
    pub fn perceptualize<S: AsRef<str>>(&mut self, tokens: &[S]) -> PerceptualFingerprint {
        let shingles = self.shingle_vector(tokens);
        // The modulus is read after interning, so it covers this document.
        let modulus = self.modulus();
        let minhash = minhash_signature(&shingles, &self.bank, modulus, self.cfg.use_parallel);

        PerceptualFingerprint {
            minhash,
            meta: PerceptualMeta {
                perceptual_version: PERCEPTUAL_VERSION,
                algorithm_name: PERCEPTUAL_ALGORITHM.to_string(),
                num_perm: self.cfg.num_perm,
                min_shingle: self.cfg.min_shingle,
                max_shingle: self.cfg.max_shingle,
                modulus,
                shingle_count: shingles.len(),
                use_parallel: self.cfg.use_parallel,
            },
        }
    }

    /// Check that a deserialized generator is internally consistent.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        self.cfg.validate()?;
        if self.bank.len() != self.cfg.num_perm {
            return Err(PerceptualError::BankSizeMismatch {
                expected: self.cfg.num_perm,
                actual: self.bank.len(),
            });
        }
        if self.bank != HashBank::new(self.cfg.num_perm) {
            return Err(PerceptualError::InconsistentVocabulary(
                "hash bank masks do not match their seeds".into(),
            ));
        }
        self.vocab.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> PerceptualConfig {
        PerceptualConfig::default().with_num_perm(24)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = Perceptualizer::new(PerceptualConfig::default().with_max_shingle(0));
        assert!(matches!(err, Err(PerceptualError::InvalidMaxShingle { .. })));
    }

    #[test]
    fn signature_length_matches_num_perm() {
        let mut hasher = Perceptualizer::new(small_config()).unwrap();
        let fp = hasher.perceptualize(&["a", "b", "c"]);
        assert_eq!(fp.minhash.len(), 24);
        assert_eq!(fp.meta.num_perm, 24);
    }

    #[test]
    fn modulus_tracks_vocabulary_growth() {
        let mut hasher = Perceptualizer::new(small_config()).unwrap();
        let first = hasher.perceptualize(&["a", "b"]);
        let second = hasher.perceptualize(&["c", "d", "e"]);
        assert_eq!(first.meta.modulus, 7);
        assert!(second.meta.modulus > first.meta.modulus);
        assert_eq!(second.meta.modulus, hasher.vocabulary().len() as u64);
    }

    #[test]
    fn fixed_modulus_keeps_signatures_comparable() {
        let cfg = small_config().with_modulus(ModulusPolicy::Fixed(1 << 20));
        let mut hasher = Perceptualizer::new(cfg).unwrap();
        let before = hasher.perceptualize(&["you", "can", "put", "lipstick"]);
        hasher.perceptualize(&["binders", "full", "of", "women"]);
        let after = hasher.perceptualize(&["you", "can", "put", "lipstick"]);
        assert_eq!(before.minhash, after.minhash);
        assert_eq!(after.meta.modulus, 1 << 20);
    }

    #[test]
    fn identical_documents_at_same_vocabulary_size_match() {
        let mut hasher = Perceptualizer::new(small_config()).unwrap();
        let a = hasher.perceptualize(&["lipstick", "on", "a", "pig"]);
        let b = hasher.perceptualize(&["lipstick", "on", "a", "pig"]);
        assert_eq!(a.minhash, b.minhash);
    }

    #[test]
    fn shingle_count_matches_shingle_vector() {
        let mut hasher = Perceptualizer::new(small_config()).unwrap();
        let fp = hasher.perceptualize(&["a", "b"]);
        assert_eq!(fp.meta.shingle_count, 7);
        assert_eq!(hasher.shingle_vector(&["a", "b"]).len(), 7);
    }

    #[test]
    fn validate_detects_tampered_bank() {
        let mut hasher = Perceptualizer::new(small_config()).unwrap();
        hasher.bank = HashBank::new(10);
        assert!(matches!(
            hasher.validate(),
            Err(PerceptualError::BankSizeMismatch {
                expected: 24,
                actual: 10
            })
        ));
    }

    #[test]
    fn serde_roundtrip_reproduces_future_signatures() {
        let mut original = Perceptualizer::new(small_config()).unwrap();
        original.perceptualize(&["put", "lipstick", "on", "a", "pig"]);

        let json = serde_json::to_string(&original).unwrap();
        let mut restored: Perceptualizer = serde_json::from_str(&json).unwrap();
        assert!(restored.validate().is_ok());

        let probe = ["lipstick", "on", "the", "pig"];
        assert_eq!(original.perceptualize(&probe), restored.perceptualize(&probe));
    }
}
