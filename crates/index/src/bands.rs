//! Band layout of a MinHash signature.
//!
//! A signature of length `n` is cut into `b` contiguous bands of `r` rows.
//! Each band is hashed into a single bucket key; two signatures share a
//! bucket in table `i` exactly when their rows `[i*r, i*r + r)` agree.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::IndexError;

/// `bands * rows == signature length`, checked at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BandLayout {
    bands: usize,
    rows: usize,
}

impl BandLayout {
    pub fn new(bands: usize, rows: usize, num_perm: usize) -> Result<Self, IndexError> {
        if bands == 0 || rows == 0 || bands.checked_mul(rows) != Some(num_perm) {
            return Err(IndexError::InvalidBandLayout {
                bands,
                rows,
                num_perm,
            });
        }
        Ok(Self { bands, rows })
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Expected signature length.
    pub fn signature_len(&self) -> usize {
        self.bands * self.rows
    }

    pub(crate) fn check_signature(&self, signature: &[u64]) -> Result<(), IndexError> {
        if signature.len() != self.signature_len() {
            return Err(IndexError::SignatureLength {
                expected: self.signature_len(),
                actual: signature.len(),
            });
        }
        Ok(())
    }

    /// Bucket key of `band` in `signature`.
    ///
    /// xxh3 over the little-endian bytes of the band's rows. The caller
    /// guarantees the signature length matches the layout.
    pub fn band_hash(&self, signature: &[u64], band: usize) -> u64 {
        let start = band * self.rows;
        band_hash(&signature[start..start + self.rows])
    }

    /// Bucket keys of every band, in band order.
    pub fn band_hashes(&self, signature: &[u64]) -> Result<Vec<u64>, IndexError> {
        self.check_signature(signature)?;
        Ok((0..self.bands)
            .map(|band| self.band_hash(signature, band))
            .collect())
    }
}

/// Order-sensitive, process-independent hash of one band's rows.
pub fn band_hash(rows: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(rows.len() * 8);
    for row in rows {
        bytes.extend_from_slice(&row.to_le_bytes());
    }
    xxh3_64(&bytes)
}
