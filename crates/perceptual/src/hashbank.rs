//! XOR-mask hash functions approximating random permutations of shingle ids.
//!
//! Hash function `i` maps a shingle id `x` to `(x ^ masks[i]) % modulus`.
//! Mask `i` is derived from seed `i` alone, so two banks built with the same
//! size are identical.

use serde::{Deserialize, Serialize};

/// A fixed bank of `n` hash functions, one 32-bit mask each.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashBank {
    masks: Vec<u32>,
}

impl HashBank {
    /// Build a bank of `num_hash` functions.
    pub fn new(num_hash: usize) -> Self {
        let mut masks = Vec::with_capacity(num_hash);
        masks.extend((0..num_hash).map(|i| mask_for_seed(i as u64)));
        Self { masks }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn masks(&self) -> &[u32] {
        &self.masks
    }

    /// Apply hash function `i` to shingle id `x`. `modulus` must be non-zero.
    #[inline]
    pub fn hash(&self, i: usize, x: u64, modulus: u64) -> u64 {
        xor_hash(self.masks[i], x) % modulus
    }
}

#[inline]
pub(crate) fn xor_hash(mask: u32, x: u64) -> u64 {
    x ^ u64::from(mask)
}

/// Derive one 32-bit mask from a seed: the high half of SplitMix64.
#[inline]
fn mask_for_seed(seed: u64) -> u32 {
    (splitmix64(seed) >> 32) as u32
}

/// A 64-bit hash function that is fast and has good distribution.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn banks_with_same_size_are_identical() {
        let a = HashBank::new(100);
        let b = HashBank::new(100);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn smaller_bank_is_a_prefix_of_larger_bank() {
        let small = HashBank::new(10);
        let large = HashBank::new(50);
        assert_eq!(small.masks(), &large.masks()[..10]);
    }

    #[test]
    fn masks_are_distinct() {
        let bank = HashBank::new(256);
        let unique: HashSet<u32> = bank.masks().iter().copied().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn hash_respects_modulus() {
        let bank = HashBank::new(16);
        for i in 0..bank.len() {
            for x in 0..50 {
                assert!(bank.hash(i, x, 7) < 7);
            }
        }
    }

    #[test]
    fn hash_is_xor_then_mod() {
        let bank = HashBank::new(4);
        let mask = u64::from(bank.masks()[2]);
        assert_eq!(bank.hash(2, 12345, 1000), (12345 ^ mask) % 1000);
    }

    #[test]
    fn same_id_hashes_differently_as_modulus_grows() {
        let bank = HashBank::new(32);
        let differs = (0..bank.len()).any(|i| bank.hash(i, 3, 10) != bank.hash(i, 3, 11));
        assert!(differs);
    }

    #[test]
    fn empty_bank() {
        let bank = HashBank::new(0);
        assert!(bank.is_empty());
    }

    #[test]
    fn splitmix64_avalanche_effect() {
        let diff_bits = (splitmix64(1000) ^ splitmix64(1001)).count_ones();
        assert!(diff_bits > 16);
    }
}
