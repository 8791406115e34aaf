//! Startup orchestration.
//!
//! # Responsibilities
//! - Restore the index from the snapshot when asked to
//! - Import the seed file, if configured, on top of it
//!
//! # Design Decisions
//! - A missing or corrupt snapshot is not fatal: start empty and warn
//! - A missing seed file is not fatal either; it is logged and skipped

use std::path::Path;

use crate::config::ServiceConfig;
use crate::index::{snapshot, SharedIndex, Trie};
use crate::ingest::seed;

/// Build the index the server will start with.
pub fn restore_index(config: &ServiceConfig) -> SharedIndex {
    let trie = if config.snapshot.load_on_start {
        let path = Path::new(&config.snapshot.path);
        match snapshot::load(path) {
            Ok(trie) => trie,
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot not restored, starting with an empty index");
                Trie::new()
            }
        }
    } else {
        Trie::new()
    };

    let index = SharedIndex::from_trie(trie);

    if let Some(seed_file) = &config.ingest.seed_file {
        if let Err(e) = seed::import_file(Path::new(seed_file), &index) {
            tracing::warn!(error = %e, "Seed file skipped");
        }
    }

    let stats = index.stats();
    tracing::info!(keys = stats.keys, hits = stats.hits, "Index ready");
    index
}
