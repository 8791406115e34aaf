//! Search subsystem.
//!
//! # Data Flow
//! ```text
//! /search?q=&n=
//!     → query.rs (unescape, split off the safe subquery, parse limit)
//!     → engine.rs (trie lookup, regex filter, rank, totals, truncate)
//!     → SearchResult handed to the HTTP renderer
//! ```

pub mod engine;
pub mod query;

pub use engine::{rank, ResultEntry, SearchEngine, SearchResult};
pub use query::{parse_limit, safe_subquery};
