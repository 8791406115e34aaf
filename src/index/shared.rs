//! Shared, swappable handle to the live trie.
//!
//! # Concurrency
//! ```text
//! SharedIndex ──ArcSwap──▶ Arc<RwLock<Trie>>   (current generation)
//!
//! insert / enumerate: load current generation, then lock it
//! reset:              store a fresh generation (single pointer swap)
//! ```
//!
//! An insert that loaded a generation before a reset completes wholly in
//! that generation and is discarded with it; an insert that loads after the
//! swap lands wholly in the new one. Readers holding an old generation keep
//! seeing it intact until they drop it.

use std::sync::{Arc, PoisonError, RwLock};

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::index::codec;
use crate::index::trie::Trie;

type Generation = RwLock<Trie>;

/// Point-in-time counters of the live index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub keys: usize,
    pub hits: u64,
    pub nodes: usize,
}

/// Cloneable handle shared by request handlers, ingest workers and
/// persistence.
#[derive(Clone)]
pub struct SharedIndex {
    current: Arc<ArcSwap<Generation>>,
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIndex {
    /// Create a handle over an empty trie.
    pub fn new() -> Self {
        Self::from_trie(Trie::new())
    }

    /// Create a handle over an existing trie (e.g. one restored from disk).
    pub fn from_trie(trie: Trie) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(RwLock::new(trie))),
        }
    }

    /// Insert an already-encoded key. Returns its new count.
    pub fn insert(&self, key: &str) -> u64 {
        self.write(|trie| trie.insert(key))
    }

    /// Encode a raw URL and insert it. Returns its new count.
    pub fn insert_url(&self, url: &str) -> u64 {
        self.insert(&codec::encode(url))
    }

    /// Every stored key under `prefix` in the current generation.
    pub fn prefix_enumerate(&self, prefix: &str) -> Vec<(String, u64)> {
        self.read(|trie| trie.prefix_enumerate(prefix))
    }

    /// Run `f` with shared access to the current generation.
    pub fn read<R>(&self, f: impl FnOnce(&Trie) -> R) -> R {
        let generation = self.current.load_full();
        let trie = generation.read().unwrap_or_else(PoisonError::into_inner);
        f(&trie)
    }

    /// Run `f` with exclusive access to the current generation.
    pub fn write<R>(&self, f: impl FnOnce(&mut Trie) -> R) -> R {
        let generation = self.current.load_full();
        let mut trie = generation.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut trie)
    }

    /// Discard every key by swapping in an empty generation.
    pub fn reset(&self) {
        self.replace(Trie::new());
    }

    /// Swap in `trie` as the current generation.
    pub fn replace(&self, trie: Trie) {
        self.current.store(Arc::new(RwLock::new(trie)));
    }

    pub fn stats(&self) -> IndexStats {
        self.read(|trie| IndexStats {
            keys: trie.len(),
            hits: trie.hits(),
            nodes: trie.node_count(),
        })
    }
}
