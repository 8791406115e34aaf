//! URL index subsystem.
//!
//! # Data Flow
//! ```text
//! raw URL
//!     → codec.rs (reverse host labels: a.example.com → com.example.a)
//!     → shared.rs (current generation, locked)
//!     → trie.rs (arena insert, count += 1)
//!
//! snapshot.rs reads/writes a generation independently of both paths
//! ```
//!
//! # Design Decisions
//! - Keys are ordered root-to-leaf so a literal prefix scopes a domain subtree
//! - Whole-index wipe is a pointer swap, never an in-place clear
//! - Snapshots are plain JSON, validated as a tree on load

pub mod codec;
pub mod shared;
pub mod snapshot;
pub mod trie;

pub use shared::{IndexStats, SharedIndex};
pub use snapshot::{DumpSummary, SnapshotError};
pub use trie::Trie;
