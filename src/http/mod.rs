//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (/add, /search, /dump, /reset, /status)
//!     → ingest / search / index subsystems
//!     → render.rs (plain text or JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod render;
pub mod server;

pub use server::{AppState, HttpServer};
