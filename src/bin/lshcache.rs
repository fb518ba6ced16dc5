//! `lshcache` - build or update a near-duplicate cache from a JSON Lines dump.
//!
//! Create a new cache from every document added after a timestamp:
//!
//! ```text
//! lshcache --input reports.jsonl --save reports --start 1400000000
//! ```
//!
//! Update it later with whatever was added since the last run:
//!
//! ```text
//! lshcache --input reports.jsonl --cache reports.cache
//! ```

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use lshcache::{
    load_cache, save_cache, Deduplicator, DuplicateFilter, FileStore, JsonlSource, LshCache,
    LshConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Detect near-duplicate documents with MinHash LSH.
#[derive(Parser, Debug)]
#[command(name = "lshcache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Args {
    /// JSON Lines file with one datastore row per line
    #[arg(long)]
    input: PathBuf,

    /// YAML configuration file
    #[arg(long, env = "LSHCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Existing `.cache` snapshot to load; it is updated in place
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Snapshot name for a new cache, written as `<name>.cache` [default: anon_<unix_time>]
    #[arg(long)]
    save: Option<String>,

    /// Only process documents added after this unix time
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Check documents without adding them to the cache
    #[arg(long)]
    passive: bool,

    /// Number of hashes per document (n = b * r)
    #[arg(short = 'n', long = "num-perm")]
    num_perm: Option<usize>,

    /// Number of bands
    #[arg(short = 'b', long)]
    bands: Option<usize>,

    /// Rows per band
    #[arg(short = 'r', long)]
    rows: Option<usize>,

    /// Exclusive maximum shingle length
    #[arg(long)]
    max_shingle: Option<usize>,

    /// Minimum Jaccard similarity to judge as duplicate
    #[arg(long)]
    min_jaccard: Option<f64>,

    /// Maximum edit distance rate to judge as duplicate
    #[arg(long)]
    max_edit_rate: Option<f64>,

    /// Minimum document length (tokens) for confirmation
    #[arg(long)]
    min_doc_len: Option<usize>,

    /// Write confirmed duplicate pairs to this TSV file
    #[arg(long)]
    dups_out: Option<PathBuf>,

    /// Log filter, e.g. `info` or `lshcache=debug` (falls back to RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn overrides_layout(&self) -> bool {
        self.num_perm.is_some()
            || self.bands.is_some()
            || self.rows.is_some()
            || self.max_shingle.is_some()
    }

    fn apply(&self, cfg: &mut LshConfig) {
        if let (Some(n), Some(b), Some(r)) = (self.num_perm, self.bands, self.rows) {
            cfg.cache = cfg.cache.clone().with_layout(n, b, r);
        } else {
            if let Some(n) = self.num_perm {
                cfg.cache.num_perm = n;
            }
            if let Some(b) = self.bands {
                cfg.cache.bands = b;
            }
            if let Some(r) = self.rows {
                cfg.cache.rows = r;
            }
        }
        if let Some(max_shingle) = self.max_shingle {
            cfg.cache = cfg.cache.clone().with_max_shingle(max_shingle);
        }
        if let Some(v) = self.min_jaccard {
            cfg.matcher.min_jaccard = v;
        }
        if let Some(v) = self.max_edit_rate {
            cfg.matcher.max_edit_rate = v;
        }
        if let Some(v) = self.min_doc_len {
            cfg.matcher.min_doc_len = v;
        }
        if self.passive {
            cfg.passive = true;
        }
    }
}

fn init_tracing(level: Option<&str>, json: bool) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Split `dir/name.cache` into the store directory and the snapshot key.
fn snapshot_location(path: &Path) -> anyhow::Result<(PathBuf, String)> {
    if path.extension().and_then(|e| e.to_str()) != Some(index::SNAPSHOT_EXTENSION) {
        bail!(
            "cache file {} must have the .{} extension",
            path.display(),
            index::SNAPSHOT_EXTENSION
        );
    }
    let key = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("invalid cache file name {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, key.to_string()))
}

fn default_save_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("anon_{secs}")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref(), args.json_logs);

    let mut cfg = match &args.config {
        Some(path) => LshConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LshConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    let (store, key, cache) = match &args.cache {
        Some(path) => {
            if args.overrides_layout() {
                warn!("layout options are ignored when loading a cache");
            }
            let (dir, key) = snapshot_location(path)?;
            let store = FileStore::open(&dir)?;
            let cache: LshCache<String> = load_cache(&store, &key)
                .with_context(|| format!("loading cache {}", path.display()))?;
            (store, key, cache)
        }
        None => {
            let store = FileStore::open(&cfg.snapshot.path)?;
            let key = args.save.clone().unwrap_or_else(default_save_name);
            (store, key, LshCache::new(cfg.cache.clone())?)
        }
    };

    let source = JsonlSource::open(&args.input, &cfg.ingest)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let filter = DuplicateFilter::new(cfg.matcher.clone())?;
    let mut dedup = Deduplicator::new(cache, filter, source).with_passive(cfg.passive);

    let report = dedup.sweep(args.start)?;
    if let Some(path) = &args.dups_out {
        report
            .save_tsv(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let cache = dedup.into_cache();
    info!(
        num_docs = cache.num_docs(),
        num_shingles = cache.num_shingles(),
        duplicates = report.duplicates.len(),
        mean_score = report.mean_score().unwrap_or(0.0),
        "run_complete"
    );

    save_cache(&store, &key, &cache, &cfg.snapshot.compression_config())?;
    info!(path = %store.path_for(&key).display(), "cache_saved");
    Ok(())
}
