//! Word-shingle extraction over a token stream.
//!
//! Every pass over shingle length `n` prepends one more `<start>` sentinel,
//! so pass `n` sees the document padded with `n + 1` sentinels. All windows
//! of length `n` that fit are interned and their ids collected as a set.
//! Length 0 yields the empty shingle for every window, which collapses to a
//! single shared id.

use crate::config::PerceptualConfig;
use crate::vocab::ShingleVocabulary;

/// Sentinel token prepended before each shingle pass.
pub const START_TOKEN: &str = "<start>";

/// Extract the sorted, deduplicated set of shingle ids present in `tokens`,
/// interning unseen shingles into `vocab`.
pub fn shingle_ids<S: AsRef<str>>(
    tokens: &[S],
    cfg: &PerceptualConfig,
    vocab: &mut ShingleVocabulary,
) -> Vec<u64> {
    if cfg.max_shingle == 0 || cfg.min_shingle >= cfg.max_shingle {
        return Vec::new();
    }

    // Padded once with the largest sentinel run; pass `n` starts reading
    // at the offset where exactly `n + 1` sentinels remain.
    let max_pad = cfg.max_shingle;
    let mut padded: Vec<String> = Vec::with_capacity(max_pad + tokens.len());
    padded.extend(std::iter::repeat(START_TOKEN.to_string()).take(max_pad));
    padded.extend(tokens.iter().map(|t| t.as_ref().to_string()));

    let mut ids = Vec::new();
    for n in cfg.min_shingle..cfg.max_shingle {
        let doc = &padded[max_pad - (n + 1)..];
        if n == 0 {
            ids.push(vocab.intern(&[]));
            continue;
        }
        for window in doc.windows(n) {
            ids.push(vocab.intern(window));
        }
    }

    ids.sort_unstable();
    ids.dedup();
    ids
}
