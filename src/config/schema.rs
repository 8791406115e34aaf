//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the URL index service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ingestion queue settings.
    pub ingest: IngestConfig,

    /// Search defaults.
    pub search: SearchConfig,

    /// Snapshot location and lifecycle hooks.
    pub snapshot: SnapshotConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:18080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:18080".to_string(),
        }
    }
}

/// Ingestion queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Capacity of the pending-URL buffer. Admissions beyond it are rejected.
    pub queue_capacity: usize,

    /// Number of worker tasks draining the buffer into the index.
    pub workers: usize,

    /// URLs shorter than this many bytes are silently dropped.
    pub min_url_len: usize,

    /// Optional file with one URL per line, imported at startup.
    pub seed_file: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 5000,
            workers: 4,
            min_url_len: 10,
            seed_file: None,
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit when `n` is absent or unparsable.
    pub default_limit: usize,

    /// Schemes searched when a query names only a host fragment.
    pub schemes: Vec<String>,

    /// Upper bound on compiled regex size in bytes.
    pub regex_size_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            schemes: vec!["http".to_string(), "https".to_string()],
            regex_size_limit: 1 << 20,
        }
    }
}

/// Snapshot configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Snapshot file written by `/dump` and read at startup.
    pub path: String,

    /// Restore the snapshot at startup (empty index if it is missing or corrupt).
    pub load_on_start: bool,

    /// Write a final snapshot after the ingest queue drains on shutdown.
    pub dump_on_shutdown: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "./data.db".to_string(),
            load_on_start: false,
            dump_on_shutdown: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
