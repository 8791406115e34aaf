//! Search and ranking over the shared index.
//!
//! # Algorithm
//! ```text
//! q ──safe_subquery──▶ literal ──encode_query_prefix──▶ trie prefixes
//!                                                        │
//!                          prefix_enumerate ◀────────────┘
//!                                 │
//!            decode key → regex(q).is_match(url) → keep
//!                                 │
//!       sort (count desc, url asc) → totals → truncate(limit)
//! ```
//!
//! # Design Decisions
//! - The regex is the unmodified query, matched unanchored
//! - A pattern that does not compile matches nothing; it is never an error
//! - Equal counts are ordered by URL so results are deterministic

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::index::{codec, SharedIndex};
use crate::observability::metrics;
use crate::search::query::{parse_limit, safe_subquery};

/// One matching URL and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub url: String,
    pub count: u64,
}

/// Ranked, truncated matches plus totals over every match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Number of matching URLs before truncation.
    pub total_num: usize,
    /// Sum of counts of all matching URLs before truncation.
    pub total_pv: u64,
    /// Highest-count matches, at most `limit` of them.
    pub data: Vec<ResultEntry>,
}

/// Runs searches against a shared index.
pub struct SearchEngine {
    index: SharedIndex,
    config: ArcSwap<SearchConfig>,
}

impl SearchEngine {
    pub fn new(index: SharedIndex, config: SearchConfig) -> Self {
        Self {
            index,
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Replace the search settings used by subsequent searches.
    pub fn update_config(&self, config: SearchConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<SearchConfig> {
        self.config.load_full()
    }

    /// Run query `q`, keeping at most `limit` entries (see `parse_limit`).
    pub fn search(&self, q: &str, limit: Option<&str>) -> SearchResult {
        let start = Instant::now();
        let config = self.config.load();
        let limit = parse_limit(limit, config.default_limit);

        let Some(pattern) = compile(q, config.regex_size_limit) else {
            metrics::record_search(0, start);
            return SearchResult::default();
        };

        let subquery = safe_subquery(q);
        let mut matches = Vec::new();
        for prefix in codec::encode_query_prefix(&subquery, &config.schemes) {
            for (key, count) in self.index.prefix_enumerate(&prefix) {
                let url = codec::decode(&key);
                if pattern.is_match(&url) {
                    matches.push(ResultEntry { url, count });
                }
            }
        }

        let result = rank(matches, limit);
        metrics::record_search(result.total_num, start);
        tracing::debug!(
            query = %q,
            subquery = %subquery,
            limit,
            total_num = result.total_num,
            total_pv = result.total_pv,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Search complete"
        );
        result
    }
}

fn compile(q: &str, size_limit: usize) -> Option<Regex> {
    match RegexBuilder::new(q).size_limit(size_limit).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(query = %q, error = %e, "Query is not a usable regex, nothing matches");
            None
        }
    }
}

/// Order entries by count (descending, then URL ascending), compute totals,
/// and keep the first `limit`.
pub fn rank(mut entries: Vec<ResultEntry>, limit: usize) -> SearchResult {
    entries.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.url.cmp(&b.url)));

    let total_num = entries.len();
    let total_pv = entries.iter().map(|e| e.count).sum();
    entries.truncate(limit.min(total_num));

    SearchResult {
        total_num,
        total_pv,
        data: entries,
    }
}
