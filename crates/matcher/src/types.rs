use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which confirmed candidate wins when several pass both thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Scan every candidate; the last one to pass is reported.
    ///
    /// With a most-recent-first scan order this is the oldest qualifying
    /// document, i.e. the original a new document duplicates.
    #[default]
    LastMatch,
    /// Stop at the first candidate that passes.
    FirstMatch,
}

/// Thresholds of the confirmation stage.
///
/// `MatchConfig` is cheap to clone and serde-friendly so it can be embedded
/// in higher-level configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Exclusive lower bound on token-set Jaccard similarity, in `(0, 1]`.
    pub min_jaccard: f64,
    /// Exclusive upper bound on the normalized edit rate, in `(0, 1]`.
    pub max_edit_rate: f64,
    /// Documents with fewer tokens never take part in confirmation.
    pub min_doc_len: usize,
    pub policy: MatchPolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_jaccard: 0.8,
            max_edit_rate: 0.1,
            min_doc_len: 100,
            policy: MatchPolicy::LastMatch,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_jaccard(mut self, min_jaccard: f64) -> Self {
        self.min_jaccard = min_jaccard;
        self
    }

    pub fn with_max_edit_rate(mut self, max_edit_rate: f64) -> Self {
        self.max_edit_rate = max_edit_rate;
        self
    }

    pub fn with_min_doc_len(mut self, min_doc_len: usize) -> Self {
        self.min_doc_len = min_doc_len;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate the thresholds.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(self.min_jaccard > 0.0 && self.min_jaccard <= 1.0) {
            return Err(MatchError::InvalidConfig(format!(
                "min_jaccard must be in (0, 1] (got {})",
                self.min_jaccard
            )));
        }
        if !(self.max_edit_rate > 0.0 && self.max_edit_rate <= 1.0) {
            return Err(MatchError::InvalidConfig(format!(
                "max_edit_rate must be in (0, 1] (got {})",
                self.max_edit_rate
            )));
        }
        Ok(())
    }
}

/// A candidate that passed both thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation<I> {
    /// Id of the earlier document the probe duplicates.
    pub id: I,
    pub jaccard: f64,
    pub edit_rate: f64,
}

/// Errors produced by the confirmation layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Invalid thresholds.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The id-to-tokens lookup failed.
    #[error("candidate lookup failed: {0}")]
    Lookup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.min_jaccard, 0.8);
        assert_eq!(cfg.max_edit_rate, 0.1);
        assert_eq!(cfg.min_doc_len, 100);
        assert_eq!(cfg.policy, MatchPolicy::LastMatch);
    }

    #[test]
    fn thresholds_must_be_in_unit_interval() {
        for cfg in [
            MatchConfig::new().with_min_jaccard(0.0),
            MatchConfig::new().with_min_jaccard(1.5),
            MatchConfig::new().with_min_jaccard(f64::NAN),
            MatchConfig::new().with_max_edit_rate(0.0),
            MatchConfig::new().with_max_edit_rate(-0.1),
        ] {
            let err = cfg.validate().expect_err("config should be invalid");
            assert!(matches!(err, MatchError::InvalidConfig(_)));
        }
        assert!(MatchConfig::new()
            .with_min_jaccard(1.0)
            .with_max_edit_rate(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn invalid_min_jaccard_names_the_field() {
        let err = MatchConfig::new().with_min_jaccard(2.0).validate().unwrap_err();
        match err {
            MatchError::InvalidConfig(msg) => assert!(msg.contains("min_jaccard")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_min_doc_len_is_rejected_by_serde() {
        let parsed: Result<MatchConfig, _> = serde_json::from_str(r#"{"min_doc_len": -1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: MatchConfig =
            serde_json::from_str(r#"{"min_jaccard": 0.9, "policy": "first_match"}"#).unwrap();
        assert_eq!(cfg.min_jaccard, 0.9);
        assert_eq!(cfg.max_edit_rate, 0.1);
        assert_eq!(cfg.policy, MatchPolicy::FirstMatch);
    }
}
