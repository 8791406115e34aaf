//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → restore snapshot (optional) → import seed file → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain ingest queue → final dump → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
