//! MinHash signatures over shingle-id sets.
//!
//! Component `i` of a signature is the minimum of hash function `i` over
//! every shingle id of the document (Mining of Massive Datasets, §3.3.4).
//! Signatures are computed fresh per document and never stored on their own.

use rayon::prelude::*;

use crate::hashbank::{xor_hash, HashBank};

/// Value of every signature component when the shingle set is empty.
pub const EMPTY_SLOT: u64 = u64::MAX;

/// Compute a MinHash signature (parallel if `use_parallel = true`).
///
/// The result has one component per hash function in `bank`. An empty
/// shingle set, or a zero modulus, yields [`EMPTY_SLOT`] everywhere.
pub fn minhash_signature(
    unique_shingles: &[u64],
    bank: &HashBank,
    modulus: u64,
    use_parallel: bool,
) -> Vec<u64> {
    let m = bank.len();
    if m == 0 {
        return Vec::new();
    }

    if unique_shingles.is_empty() || modulus == 0 {
        return vec![EMPTY_SLOT; m];
    }

    let mut result = Vec::with_capacity(m);

    if use_parallel {
        bank.masks()
            .par_iter()
            .map(|&mask| compute_slot(unique_shingles, mask, modulus))
            .collect_into_vec(&mut result);
    } else {
        for &mask in bank.masks() {
            result.push(compute_slot(unique_shingles, mask, modulus));
        }
    }

    result
}

/// Computes a single slot in the MinHash signature.
#[inline]
pub(crate) fn compute_slot(unique_shingles: &[u64], mask: u32, modulus: u64) -> u64 {
    let mut minv = EMPTY_SLOT;
    for &x in unique_shingles {
        let h = xor_hash(mask, x) % modulus;
        if h < minv {
            minv = h;
        }
    }
    minv
}

/// Fraction of positions on which two signatures agree.
///
/// Approximates the Jaccard similarity of the underlying shingle sets when
/// both signatures were computed with the same modulus. Returns 0.0 for
/// mismatched or empty signatures.
pub fn estimate_jaccard(a: &[u64], b: &[u64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let agree = a.iter().zip(b).filter(|(x, y)| x == y).count();
    agree as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bank_returns_empty_signature() {
        let bank = HashBank::new(0);
        assert!(minhash_signature(&[1, 2, 3], &bank, 10, false).is_empty());
    }

    #[test]
    fn empty_shingles_return_sentinel() {
        let bank = HashBank::new(16);
        let sig = minhash_signature(&[], &bank, 10, false);
        assert_eq!(sig.len(), 16);
        assert!(sig.iter().all(|&v| v == EMPTY_SLOT));
    }

    #[test]
    fn zero_modulus_returns_sentinel() {
        let bank = HashBank::new(4);
        let sig = minhash_signature(&[1, 2], &bank, 0, false);
        assert!(sig.iter().all(|&v| v == EMPTY_SLOT));
    }

    #[test]
    fn each_slot_is_the_minimum_over_the_set() {
        let bank = HashBank::new(8);
        let shingles = [0u64, 3, 5, 9];
        let modulus = 10;
        let sig = minhash_signature(&shingles, &bank, modulus, false);
        for (i, &slot) in sig.iter().enumerate() {
            let expected = shingles
                .iter()
                .map(|&x| bank.hash(i, x, modulus))
                .min()
                .unwrap();
            assert_eq!(slot, expected);
            assert!(slot < modulus);
        }
    }

    #[test]
    fn deterministic() {
        let bank = HashBank::new(32);
        let a = minhash_signature(&[1, 2, 3, 4, 5], &bank, 100, false);
        let b = minhash_signature(&[1, 2, 3, 4, 5], &bank, 100, false);
        assert_eq!(a, b);
    }

    #[test]
    fn parallel_equals_sequential() {
        let bank = HashBank::new(128);
        let shingles: Vec<u64> = (0..40).collect();
        let seq = minhash_signature(&shingles, &bank, 97, false);
        let par = minhash_signature(&shingles, &bank, 97, true);
        assert_eq!(seq, par);
    }

    #[test]
    fn similar_sets_agree_more_than_disjoint_sets() {
        let bank = HashBank::new(256);
        let modulus = 1 << 16;
        let base: Vec<u64> = (0..100).collect();
        let near: Vec<u64> = (0..95).chain(1000..1005).collect();
        let far: Vec<u64> = (5000..5100).collect();

        let sig_base = minhash_signature(&base, &bank, modulus, false);
        let sig_near = minhash_signature(&near, &bank, modulus, false);
        let sig_far = minhash_signature(&far, &bank, modulus, false);

        let near_score = estimate_jaccard(&sig_base, &sig_near);
        let far_score = estimate_jaccard(&sig_base, &sig_far);
        // XOR masks are far from min-wise independent on contiguous id
        // ranges, so only the ordering is asserted.
        assert!(near_score > 0.25, "near score {near_score}");
        assert!(far_score < near_score, "far score {far_score}");
    }

    #[test]
    fn estimate_jaccard_handles_mismatched_lengths() {
        assert_eq!(estimate_jaccard(&[1, 2], &[1]), 0.0);
        assert_eq!(estimate_jaccard(&[], &[]), 0.0);
        assert_eq!(estimate_jaccard(&[1, 2, 3, 4], &[1, 2, 0, 0]), 0.5);
    }
}
