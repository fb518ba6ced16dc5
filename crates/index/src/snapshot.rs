//! Whole-cache snapshots.
//!
//! Layout: 4-byte magic, little-endian `u16` schema version, one codec tag
//! byte, then the bincode-encoded [`LshCache`] (compressed with the tagged
//! codec). The header stays uncompressed so a reader can reject foreign or
//! outdated files before decoding anything.

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use zstd::{decode_all, encode_all};

use crate::backend::SnapshotStore;
use crate::cache::LshCache;
use crate::{DocId, IndexError};

/// Bump this value whenever the snapshot layout changes.
pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"LSHC";

const HEADER_LEN: usize = 7;

/// Compression codec options for snapshots.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    /// No compression (useful for debugging).
    None,
    /// Zstd compression (default, good balance of speed and ratio).
    #[default]
    Zstd,
}

impl CompressionCodec {
    fn tag(self) -> u8 {
        match self {
            CompressionCodec::None => 0,
            CompressionCodec::Zstd => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, IndexError> {
        match tag {
            0 => Ok(CompressionCodec::None),
            1 => Ok(CompressionCodec::Zstd),
            other => Err(IndexError::Incompatible(format!(
                "unknown compression tag {other}"
            ))),
        }
    }
}

/// Compression behavior configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// Compression level (1-22 for Zstd).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => {
                encode_all(data, self.level).map_err(|e| IndexError::Zstd(e.to_string()))
            }
        }
    }
}

fn decompress(codec: CompressionCodec, data: &[u8]) -> Result<Vec<u8>, IndexError> {
    match codec {
        CompressionCodec::None => Ok(data.to_vec()),
        CompressionCodec::Zstd => decode_all(data).map_err(|e| IndexError::Zstd(e.to_string())),
    }
}

/// Serialize the whole cache into snapshot bytes.
pub fn encode_snapshot<I>(
    cache: &LshCache<I>,
    compression: &CompressionConfig,
) -> Result<Vec<u8>, IndexError>
where
    I: DocId + Serialize,
{
    let encoded = encode_to_vec(cache, standard())?;
    let body = compression.compress(&encoded)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_SCHEMA_VERSION.to_le_bytes());
    bytes.push(compression.codec.tag());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Restore a cache from snapshot bytes and check it for consistency.
pub fn decode_snapshot<I>(bytes: &[u8]) -> Result<LshCache<I>, IndexError>
where
    I: DocId + DeserializeOwned,
{
    if bytes.len() < HEADER_LEN {
        return Err(IndexError::Incompatible(format!(
            "snapshot is {} bytes, shorter than its header",
            bytes.len()
        )));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if header[..4] != SNAPSHOT_MAGIC {
        return Err(IndexError::Incompatible("not an LSH cache snapshot".into()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != SNAPSHOT_SCHEMA_VERSION {
        return Err(IndexError::Incompatible(format!(
            "schema version {version}, expected {SNAPSHOT_SCHEMA_VERSION}"
        )));
    }
    let codec = CompressionCodec::from_tag(header[6])?;

    let decompressed = decompress(codec, body)?;
    let (cache, read): (LshCache<I>, usize) = decode_from_slice(&decompressed, standard())?;
    if read != decompressed.len() {
        return Err(IndexError::Decode(format!(
            "{} trailing bytes after cache state",
            decompressed.len() - read
        )));
    }
    cache.validate()?;
    Ok(cache)
}

/// Encode `cache` and write it to `store` under `key`.
pub fn save_cache<I>(
    store: &dyn SnapshotStore,
    key: &str,
    cache: &LshCache<I>,
    compression: &CompressionConfig,
) -> Result<(), IndexError>
where
    I: DocId + Serialize,
{
    let span = info_span!("snapshot_save", key);
    let _guard = span.enter();

    let bytes = encode_snapshot(cache, compression)?;
    store.put(key, &bytes)?;
    info!(
        bytes = bytes.len(),
        num_docs = cache.num_docs(),
        num_shingles = cache.num_shingles(),
        "snapshot_saved"
    );
    Ok(())
}

/// Read and decode the snapshot stored under `key`.
pub fn load_cache<I>(store: &dyn SnapshotStore, key: &str) -> Result<LshCache<I>, IndexError>
where
    I: DocId + DeserializeOwned,
{
    let span = info_span!("snapshot_load", key);
    let _guard = span.enter();

    let bytes = store
        .get(key)?
        .ok_or_else(|| IndexError::NotFound(key.to_string()))?;
    let cache = decode_snapshot(&bytes)?;
    info!(
        bytes = bytes.len(),
        num_docs = cache.num_docs(),
        most_recent_insert = cache.most_recent_insert(),
        "snapshot_loaded"
    );
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryStore;
    use crate::cache::CacheConfig;

    fn populated() -> LshCache<String> {
        let mut cache = LshCache::new(CacheConfig::new().with_layout(20, 5, 4)).unwrap();
        for (i, text) in [
            "lipstick on a pig",
            "you can put lipstick on a pig",
            "a b c d e f",
        ]
        .iter()
        .enumerate()
        {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            cache.insert(&format!("doc-{i}"), &tokens, i as i64 + 1).unwrap();
        }
        cache
    }

    #[test]
    fn roundtrip_preserves_state() {
        for codec in [CompressionCodec::None, CompressionCodec::Zstd] {
            let cache = populated();
            let bytes = encode_snapshot(&cache, &CompressionConfig::default().with_codec(codec))
                .unwrap();
            let restored: LshCache<String> = decode_snapshot(&bytes).unwrap();
            assert_eq!(restored, cache);
        }
    }

    #[test]
    fn restored_cache_computes_identical_candidates() {
        let mut original = populated();
        let bytes = encode_snapshot(&original, &CompressionConfig::default()).unwrap();
        let mut restored: LshCache<String> = decode_snapshot(&bytes).unwrap();

        let probe = ["you", "can", "put", "lipstick", "on", "the", "pig"];
        let id = "probe".to_string();
        assert_eq!(
            original.insert(&id, &probe, 10).unwrap(),
            restored.insert(&id, &probe, 10).unwrap()
        );
        assert_eq!(original, restored);
    }

    #[test]
    fn rejects_foreign_bytes() {
        let err = decode_snapshot::<String>(b"not a snapshot at all").unwrap_err();
        assert!(matches!(err, IndexError::Incompatible(_)));

        let err = decode_snapshot::<String>(b"LSH").unwrap_err();
        assert!(matches!(err, IndexError::Incompatible(_)));
    }

    #[test]
    fn rejects_other_schema_versions() {
        let mut bytes = encode_snapshot(&populated(), &CompressionConfig::default()).unwrap();
        bytes[4] = bytes[4].wrapping_add(1);
        let err = decode_snapshot::<String>(&bytes).unwrap_err();
        assert!(matches!(err, IndexError::Incompatible(msg) if msg.contains("schema version")));
    }

    #[test]
    fn rejects_truncated_body() {
        let bytes = encode_snapshot(
            &populated(),
            &CompressionConfig::default().with_codec(CompressionCodec::None),
        )
        .unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            decode_snapshot::<String>(truncated),
            Err(IndexError::Decode(_))
        ));
    }

    #[test]
    fn save_and_load_through_store() {
        let store = InMemoryStore::new();
        let cache = populated();
        save_cache(&store, "run", &cache, &CompressionConfig::default()).unwrap();
        let loaded: LshCache<String> = load_cache(&store, "run").unwrap();
        assert_eq!(loaded.num_docs(), 3);
        assert_eq!(loaded.most_recent_insert(), 3);
        assert_eq!(loaded, cache);
    }

    #[test]
    fn load_of_missing_key_is_not_found() {
        let store = InMemoryStore::new();
        let err = load_cache::<String>(&store, "missing").unwrap_err();
        assert_eq!(err, IndexError::NotFound("missing".into()));
    }
}
