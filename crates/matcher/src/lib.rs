//! # LSH Cache Matcher (`matcher`)
//!
//! ## Purpose
//!
//! LSH candidates are only *likely* near-duplicates: two documents land in
//! the same bucket when their MinHash signatures agree on one full band.
//! `matcher` re-checks each candidate against the probe with exact measures
//! before a duplicate is declared.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: `min_jaccard`, `max_edit_rate`, `min_doc_len` and the
//!   [`MatchPolicy`] that decides which of several passing candidates wins.
//! - [`TokenLookup`]: fetches candidate token sequences in scan order
//!   (implemented for `HashMap` and `BTreeMap`).
//! - [`DuplicateFilter`]: applies the minimum-length gate, then token-set
//!   Jaccard (`> min_jaccard`), then the normalized edit rate
//!   (`< max_edit_rate`).
//!
//! ## Example Usage
//!
//! ```
//! use std::collections::HashMap;
//! use matcher::{DuplicateFilter, MatchConfig};
//!
//! let filter = DuplicateFilter::new(MatchConfig::default().with_min_doc_len(0)).unwrap();
//!
//! let tokens = |s: &str| s.split_whitespace().map(String::from).collect::<Vec<_>>();
//! let mut docs = HashMap::new();
//! docs.insert(7u64, tokens("you can put lipstick on a pig"));
//!
//! let hit = filter
//!     .confirm(&tokens("you can put lipstick on a pig"), &[7], &docs)
//!     .unwrap()
//!     .expect("exact duplicate");
//! assert_eq!(hit.id, 7);
//! ```
//!
//! ## Observability
//!
//! Install a [`ConfirmMetrics`] implementation via [`set_confirm_metrics`]
//! to record per-call latency, candidate counts and outcomes.

pub mod engine;
pub mod metrics;
pub mod similarity;
pub mod types;

pub use crate::engine::{DuplicateFilter, TokenLookup};
pub use crate::metrics::{set_confirm_metrics, ConfirmMetrics};
pub use crate::similarity::{edit_rate, jaccard, levenshtein};
pub use crate::types::{Confirmation, MatchConfig, MatchError, MatchPolicy};
