//! YAML Configuration File Support
//!
//! One YAML file describes a whole deduplication run: cache parameters,
//! confirmation thresholds, how rows are read and where snapshots go.
//! Every section is optional and falls back to its defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "reports"
//!
//! cache:
//!   n: 100
//!   b: 20
//!   r: 5
//!   max_shingle: 3
//!   modulus: vocabulary
//!
//! matcher:
//!   min_jaccard: 0.8
//!   max_edit_rate: 0.1
//!   min_doc_len: 100
//!   policy: last_match
//!
//! ingest:
//!   id_field: "_id"
//!   date_field: "DateAdded"
//!   text_fields: ["URL", "Title", "Content", "ExtendedContent"]
//!
//! snapshot:
//!   path: "/var/lib/lshcache"
//!   compression: zstd
//!   level: 3
//!
//! passive: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use index::{CacheConfig, CompressionCodec, CompressionConfig};
use ingest::IngestConfig;
use matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for a deduplication run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LshConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub matcher: MatchConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Check documents without inserting them.
    #[serde(default)]
    pub passive: bool,
}

impl LshConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: LshConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.cache
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("cache: {e}")))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.snapshot.validate()?;

        Ok(())
    }
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            cache: CacheConfig::default(),
            matcher: MatchConfig::default(),
            ingest: IngestConfig::default(),
            snapshot: SnapshotConfig::default(),
            passive: false,
        }
    }
}

/// Where and how cache snapshots are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Directory holding `<name>.cache` files.
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_level")]
    pub level: i32,
}

impl SnapshotConfig {
    pub fn compression_config(&self) -> CompressionConfig {
        CompressionConfig::new(self.compression, self.level)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "snapshot.path must not be empty".into(),
            ));
        }
        if self.compression == CompressionCodec::Zstd && !(1..=22).contains(&self.level) {
            return Err(ConfigLoadError::Validation(format!(
                "snapshot.level must be within 1..=22 for zstd, got {}",
                self.level
            )));
        }
        Ok(())
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            compression: CompressionCodec::default(),
            level: default_level(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_level() -> i32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg = LshConfig::from_yaml("version: \"1\"\n").unwrap();
        assert_eq!(
            cfg,
            LshConfig {
                version: "1".into(),
                ..LshConfig::default()
            }
        );
        assert_eq!(cfg.cache.num_perm, 100);
        assert_eq!(cfg.matcher.min_doc_len, 100);
        assert!(!cfg.passive);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let err = LshConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn inconsistent_layout_is_a_validation_error() {
        let yaml = "version: \"1.0\"\ncache:\n  n: 100\n  b: 7\n  r: 5\n";
        let err = LshConfig::from_yaml(yaml).unwrap_err();
        match err {
            ConfigLoadError::Validation(msg) => assert!(msg.starts_with("cache:"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zstd_level_is_bounded() {
        let yaml = "version: \"1.0\"\nsnapshot:\n  compression: zstd\n  level: 40\n";
        assert!(matches!(
            LshConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));

        let yaml = "version: \"1.0\"\nsnapshot:\n  compression: none\n  level: 40\n";
        let cfg = LshConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.snapshot.compression_config().codec, CompressionCodec::None);
    }

    #[test]
    fn yaml_round_trip() {
        let mut cfg = LshConfig::default();
        cfg.passive = true;
        cfg.cache = cfg.cache.with_layout(20, 5, 4);
        let yaml = cfg.to_yaml().unwrap();
        assert_eq!(LshConfig::from_yaml(&yaml).unwrap(), cfg);
    }
}
