//! Ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! /add?q=<url>
//!     → queue.rs admit (length filter, non-blocking try_send)
//!     → bounded buffer (capacity from config)
//!     → worker tasks (codec encode → index insert)
//!
//! startup:
//!     seed.rs (file of URLs → direct inserts)
//! ```

pub mod queue;
pub mod seed;

pub use queue::{Admission, IngestCounters, IngestQueue, IngestStats, IngestWorkers};
