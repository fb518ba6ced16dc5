use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};
use std::time::Instant;

use tracing::debug;

use crate::metrics::metrics_recorder;
use crate::similarity::{edit_rate, jaccard};
use crate::types::{Confirmation, MatchConfig, MatchError, MatchPolicy};


/// Source of candidate token sequences for the confirmation stage.
pub trait TokenLookup<I> {
    /// Token sequences for `ids`, in the order they should be scanned.
    ///
    /// Ids the lookup does not know are left out.
    fn fetch_tokens(&self, ids: &[I]) -> Result<Vec<(I, Vec<String>)>, MatchError>;
}

impl<I, S> TokenLookup<I> for HashMap<I, Vec<String>, S>
where
    I: Clone + Eq + Hash,
    S: BuildHasher,
{
    fn fetch_tokens(&self, ids: &[I]) -> Result<Vec<(I, Vec<String>)>, MatchError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get(id).map(|tokens| (id.clone(), tokens.clone())))
            .collect())
    }
}

impl<I: Clone + Ord> TokenLookup<I> for BTreeMap<I, Vec<String>> {
    fn fetch_tokens(&self, ids: &[I]) -> Result<Vec<(I, Vec<String>)>, MatchError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get(id).map(|tokens| (id.clone(), tokens.clone())))
            .collect())
    }
}

/// Confirms LSH candidates as duplicates with exact similarity measures.
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    cfg: MatchConfig,
}

impl DuplicateFilter {
    /// Validate `cfg` and build a filter.
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Whether a document of `len` tokens may take part in confirmation.
    pub fn admits(&self, len: usize) -> bool {
        len >= self.cfg.min_doc_len
    }

    /// Jaccard and edit rate of a pair that passes both thresholds.
    ///
    /// The edit rate is only computed once the Jaccard check passes.
    pub fn compare<S: AsRef<str>, T: AsRef<str>>(
        &self,
        probe: &[S],
        candidate: &[T],
    ) -> Option<(f64, f64)> {
        let jac = jaccard(probe, candidate);
        if jac <= self.cfg.min_jaccard {
            return None;
        }
        let rate = edit_rate(probe, candidate);
        (rate < self.cfg.max_edit_rate).then_some((jac, rate))
    }

    /// Find the candidate `probe` duplicates, if any.
    ///
    /// Candidates are scanned in the order `lookup` returns them. Probes and
    /// candidates shorter than `min_doc_len` tokens are never confirmed.
    pub fn confirm<I, S, L>(
        &self,
        probe: &[S],
        candidates: &[I],
        lookup: &L,
    ) -> Result<Option<Confirmation<I>>, MatchError>
    where
        I: Clone + Debug,
        S: AsRef<str>,
        L: TokenLookup<I> + ?Sized,
    {
        let start = Instant::now();
        let mut compared = 0;
        let mut found: Option<Confirmation<I>> = None;

        if self.admits(probe.len()) && !candidates.is_empty() {
            for (id, tokens) in lookup.fetch_tokens(candidates)? {
                if !self.admits(tokens.len()) {
                    continue;
                }
                compared += 1;
                if let Some((jac, rate)) = self.compare(probe, &tokens) {
                    debug!(candidate = ?id, jaccard = jac, edit_rate = rate, "candidate_confirmed");
                    found = Some(Confirmation {
                        id,
                        jaccard: jac,
                        edit_rate: rate,
                    });
                    if self.cfg.policy == MatchPolicy::FirstMatch {
                        break;
                    }
                }
            }
        }

        if let Some(recorder) = metrics_recorder() {
            recorder.record_confirm(start.elapsed(), compared, found.is_some());
        }
        Ok(found)
    }
}
