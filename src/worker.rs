//! Single-writer worker: one blocking task owns the cache and applies
//! requests from a queue, one at a time.
//!
//! Every request runs to completion before the next is taken, so a queued
//! [`CacheHandle::save`] always captures the cache between documents.
//! When every handle is dropped the queue closes and the task hands the
//! cache back through its `JoinHandle`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), lshcache::PipelineError> {
//! use index::{CacheConfig, LshCache};
//! use lshcache::worker::spawn_worker;
//!
//! let cache: LshCache<String> = LshCache::new(CacheConfig::default())?;
//! let (handle, task) = spawn_worker(cache, 64);
//! let tokens: Vec<String> = "lipstick on a pig".split(' ').map(String::from).collect();
//! handle.insert("r1".into(), tokens, 1_700_000_000).await?;
//! drop(handle);
//! let cache = task.await.expect("worker panicked");
//! assert_eq!(cache.num_docs(), 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use index::{
    save_cache, CheckOutcome, CompressionConfig, DocId, IndexError, InsertOutcome, LshCache,
    SnapshotStore,
};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::PipelineError;

/// Point-in-time counters of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub num_docs: u64,
    pub num_shingles: usize,
    pub most_recent_insert: i64,
}

type Reply<T> = oneshot::Sender<Result<T, IndexError>>;

enum Request<I> {
    Check {
        id: I,
        tokens: Vec<String>,
        reply: Reply<CheckOutcome<I>>,
    },
    Insert {
        id: I,
        tokens: Vec<String>,
        date_added: i64,
        reply: Reply<InsertOutcome<I>>,
    },
    Process {
        id: I,
        tokens: Vec<String>,
        date_added: i64,
        passive: bool,
        reply: Reply<CheckOutcome<I>>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    Save {
        store: Arc<dyn SnapshotStore>,
        key: String,
        compression: CompressionConfig,
        reply: Reply<()>,
    },
}

/// Cloneable sender side of the worker queue.
pub struct CacheHandle<I> {
    tx: mpsc::Sender<Request<I>>,
}

impl<I> Clone for CacheHandle<I> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Move `cache` onto a blocking task and return a handle to it.
///
/// `queue_depth` bounds the number of requests waiting; senders wait for
/// room when it is full.
pub fn spawn_worker<I>(
    cache: LshCache<I>,
    queue_depth: usize,
) -> (CacheHandle<I>, JoinHandle<LshCache<I>>)
where
    I: DocId + Serialize,
{
    let (tx, rx) = mpsc::channel(queue_depth.max(1));
    let task = tokio::task::spawn_blocking(move || run(cache, rx));
    (CacheHandle { tx }, task)
}

fn run<I>(mut cache: LshCache<I>, mut rx: mpsc::Receiver<Request<I>>) -> LshCache<I>
where
    I: DocId + Serialize,
{
    info!(num_docs = cache.num_docs(), "cache_worker_started");
    // A send error means the caller stopped waiting; the work is done either way.
    while let Some(request) = rx.blocking_recv() {
        match request {
            Request::Check { id, tokens, reply } => {
                let _ = reply.send(cache.check(&id, &tokens));
            }
            Request::Insert {
                id,
                tokens,
                date_added,
                reply,
            } => {
                let _ = reply.send(cache.insert(&id, &tokens, date_added));
            }
            Request::Process {
                id,
                tokens,
                date_added,
                passive,
                reply,
            } => {
                let _ = reply.send(cache.process(&id, &tokens, date_added, passive));
            }
            Request::Stats { reply } => {
                let _ = reply.send(CacheStats {
                    num_docs: cache.num_docs(),
                    num_shingles: cache.num_shingles(),
                    most_recent_insert: cache.most_recent_insert(),
                });
            }
            Request::Save {
                store,
                key,
                compression,
                reply,
            } => {
                debug!(key = %key, "cache_worker_save");
                let _ = reply.send(save_cache(store.as_ref(), &key, &cache, &compression));
            }
        }
    }
    info!(num_docs = cache.num_docs(), "cache_worker_stopped");
    cache
}

impl<I: DocId> CacheHandle<I> {
    async fn call<T>(
        &self,
        request: Request<I>,
        rx: oneshot::Receiver<Result<T, IndexError>>,
    ) -> Result<T, PipelineError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| PipelineError::WorkerClosed)?;
        let result = rx.await.map_err(|_| PipelineError::WorkerClosed)?;
        Ok(result?)
    }

    /// Per-band candidates without inserting.
    pub async fn check(
        &self,
        id: I,
        tokens: Vec<String>,
    ) -> Result<CheckOutcome<I>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Request::Check { id, tokens, reply }, rx).await
    }

    pub async fn insert(
        &self,
        id: I,
        tokens: Vec<String>,
        date_added: i64,
    ) -> Result<InsertOutcome<I>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Request::Insert {
                id,
                tokens,
                date_added,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn process(
        &self,
        id: I,
        tokens: Vec<String>,
        date_added: i64,
        passive: bool,
    ) -> Result<CheckOutcome<I>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Request::Process {
                id,
                tokens,
                date_added,
                passive,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn stats(&self) -> Result<CacheStats, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Stats { reply })
            .await
            .map_err(|_| PipelineError::WorkerClosed)?;
        rx.await.map_err(|_| PipelineError::WorkerClosed)
    }

    /// Snapshot the cache into `store` under `key`, after every request
    /// queued before this one.
    pub async fn save(
        &self,
        store: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        compression: CompressionConfig,
    ) -> Result<(), PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Request::Save {
                store,
                key: key.into(),
                compression,
                reply,
            },
            rx,
        )
        .await
    }
}
