//! Bounded admission queue and its worker pool.
//!
//! # Responsibilities
//! - Filter out empty and too-short URLs at admission
//! - Hand valid URLs to a bounded buffer without blocking the caller
//! - Drain the buffer into the shared index from a fixed set of workers
//!
//! # Design Decisions
//! - Overflow is rejected, not blocked: `admit` reports `Rejected` and the
//!   URL is not retried
//! - Workers share one receiver; the buffer is the only backpressure point
//! - Workers exit after every `IngestQueue` clone is dropped and the buffer
//!   is empty, so dropping the queue and joining drains it

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::IngestConfig;
use crate::index::{codec, SharedIndex};
use crate::observability::metrics;

/// Outcome of a single admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Buffered for indexing.
    Queued,
    /// Empty or shorter than the minimum length; silently ignored.
    Dropped,
    /// Buffer full; the URL was not accepted.
    Rejected,
    /// Workers are gone; the URL was not accepted.
    Closed,
}

impl Admission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Admission::Queued => "queued",
            Admission::Dropped => "dropped",
            Admission::Rejected => "rejected",
            Admission::Closed => "closed",
        }
    }
}

/// Running totals for the ingestion pipeline.
#[derive(Debug, Default)]
pub struct IngestStats {
    queued: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    closed: AtomicU64,
    inserted: AtomicU64,
}

/// Copy of `IngestStats` at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounters {
    pub queued: u64,
    pub dropped: u64,
    pub rejected: u64,
    pub closed: u64,
    pub inserted: u64,
}

impl IngestStats {
    pub fn snapshot(&self) -> IngestCounters {
        IngestCounters {
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
        }
    }

    pub fn inserted(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }
}

/// Producer side of the ingestion pipeline. Cheap to clone.
#[derive(Clone)]
pub struct IngestQueue {
    tx: mpsc::Sender<String>,
    min_url_len: Arc<AtomicUsize>,
    stats: Arc<IngestStats>,
}

/// Handles of the running workers.
pub struct IngestWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl IngestWorkers {
    /// Wait for every worker to finish. Returns once all queue handles are
    /// dropped and the buffer is drained.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Ingest worker panicked");
            }
        }
    }
}

impl IngestQueue {
    /// Create the buffer and spawn its workers on the current runtime.
    pub fn start(config: &IngestConfig, index: SharedIndex) -> (Self, IngestWorkers) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(IngestStats::default());

        let handles = (0..config.workers.max(1))
            .map(|id| {
                tokio::spawn(run_worker(id, rx.clone(), index.clone(), stats.clone()))
            })
            .collect();

        tracing::info!(
            capacity = config.queue_capacity,
            workers = config.workers,
            min_url_len = config.min_url_len,
            "Ingest queue started"
        );

        (
            Self {
                tx,
                min_url_len: Arc::new(AtomicUsize::new(config.min_url_len)),
                stats,
            },
            IngestWorkers { handles },
        )
    }

    /// Offer a URL for indexing. Never blocks.
    pub fn admit(&self, url: String) -> Admission {
        let outcome = if url.is_empty() || url.len() < self.min_url_len.load(Ordering::Relaxed) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            Admission::Dropped
        } else {
            match self.tx.try_send(url) {
                Ok(()) => {
                    self.stats.queued.fetch_add(1, Ordering::Relaxed);
                    Admission::Queued
                }
                Err(mpsc::error::TrySendError::Full(url)) => {
                    self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(url = %url, "Ingest queue full, URL rejected");
                    Admission::Rejected
                }
                Err(mpsc::error::TrySendError::Closed(url)) => {
                    self.stats.closed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(url = %url, "Ingest queue closed, URL not accepted");
                    Admission::Closed
                }
            }
        };

        metrics::record_admission(outcome.as_str());
        outcome
    }

    /// Change the minimum accepted URL length for future admissions.
    pub fn set_min_url_len(&self, len: usize) {
        self.min_url_len.store(len, Ordering::Relaxed);
    }

    /// URLs currently buffered and not yet claimed by a worker.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn stats(&self) -> &Arc<IngestStats> {
        &self.stats
    }
}

async fn run_worker(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    index: SharedIndex,
    stats: Arc<IngestStats>,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(url) = next else {
            break;
        };

        let key = codec::encode(&url);
        let (count, keys) = index.write(|trie| (trie.insert(&key), trie.len()));
        stats.inserted.fetch_add(1, Ordering::Relaxed);
        metrics::record_insert(keys);

        tracing::trace!(worker = id, key = %key, count, "URL indexed");
    }

    tracing::debug!(worker = id, "Ingest worker exiting");
}
