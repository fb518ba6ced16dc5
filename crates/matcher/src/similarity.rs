//! Exact similarity measures between two token sequences.

use std::cmp::min;
use std::collections::HashSet;

/// Jaccard similarity of the token sets: `|A ∩ B| / |A ∪ B|`.
///
/// Repeated tokens count once. Two empty sequences have similarity 0.
pub fn jaccard<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T]) -> f64 {
    let a: HashSet<&str> = a.iter().map(|t| t.as_ref()).collect();
    let b: HashSet<&str> = b.iter().map(|t| t.as_ref()).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Character-level Levenshtein distance.
pub fn levenshtein(s1: &str, s2: &str) -> usize {
    let s1: Vec<char> = s1.chars().collect();
    let s2: Vec<char> = s2.chars().collect();
    if s1.is_empty() {
        return s2.len();
    }
    if s2.is_empty() {
        return s1.len();
    }

    // Two rows of the DP matrix.
    let mut prev: Vec<usize> = (0..=s2.len()).collect();
    let mut curr = vec![0; s2.len() + 1];
    for (i, c1) in s1.iter().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in s2.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            curr[j + 1] = min(
                min(prev[j + 1] + 1, curr[j] + 1), // deletion, insertion
                prev[j] + cost,                    // substitution
            );
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[s2.len()]
}

/// Levenshtein distance between the space-joined texts, divided by the
/// smaller token count.
///
/// Distance is measured in characters but normalized by tokens, so the
/// rate can exceed 1. With an empty side the rate is 0 for identical texts
/// and infinite otherwise.
pub fn edit_rate<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T]) -> f64 {
    let distance = levenshtein(&join(a), &join(b));
    let denominator = a.len().min(b.len());
    if denominator == 0 {
        return if distance == 0 { 0.0 } else { f64::INFINITY };
    }
    distance as f64 / denominator as f64
}

fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(token.as_ref());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn jaccard_of_dropped_token() {
        let score = jaccard(&toks("a b c d e f"), &toks("a b c d f"));
        assert!((score - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn jaccard_ignores_order_and_repetition() {
        assert_eq!(jaccard(&toks("a b b c"), &toks("c a b")), 1.0);
        assert_eq!(jaccard(&toks("a b"), &toks("c d")), 0.0);
    }

    #[test]
    fn jaccard_of_empty_sequences_is_zero() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&empty, &toks("a")), 0.0);
    }

    #[test]
    fn levenshtein_basic_cases() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn levenshtein_counts_characters_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn edit_rate_normalizes_by_smaller_token_count() {
        // "a b c d e f" -> "a b c d f" deletes "e " (2 chars); min length 5.
        let rate = edit_rate(&toks("a b c d e f"), &toks("a b c d f"));
        assert!((rate - 0.4).abs() < 1e-12);
    }

    #[test]
    fn edit_rate_of_identical_texts_is_zero() {
        let text = toks("you can put lipstick on a pig");
        assert_eq!(edit_rate(&text, &text), 0.0);
    }

    #[test]
    fn edit_rate_with_empty_side() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(edit_rate(&empty, &empty), 0.0);
        assert!(edit_rate(&empty, &toks("a")).is_infinite());
    }

    #[test]
    fn mixed_string_types() {
        let owned: Vec<String> = vec!["a".into(), "b".into()];
        assert_eq!(jaccard(&owned, &toks("a b")), 1.0);
        assert_eq!(edit_rate(&owned, &toks("a b")), 0.0);
    }
}
