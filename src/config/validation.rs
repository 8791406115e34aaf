//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities > 0, addresses parse)
//! - Reject scheme lists that would produce overlapping trie prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::index::codec;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("search.schemes must not be empty")]
    NoSchemes,

    #[error("search.schemes: invalid scheme {0:?}")]
    InvalidScheme(String),

    #[error("search.schemes: duplicate scheme {0:?}")]
    DuplicateScheme(String),

    #[error("snapshot.path must not be empty")]
    EmptySnapshotPath,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let positive = [
        ("ingest.queue_capacity", config.ingest.queue_capacity),
        ("ingest.workers", config.ingest.workers),
        ("search.default_limit", config.search.default_limit),
        ("search.regex_size_limit", config.search.regex_size_limit),
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.search.schemes.is_empty() {
        errors.push(ValidationError::NoSchemes);
    }
    let mut seen = HashSet::new();
    for scheme in &config.search.schemes {
        if !codec::is_scheme(scheme) {
            errors.push(ValidationError::InvalidScheme(scheme.clone()));
        } else if !seen.insert(scheme.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateScheme(scheme.clone()));
        }
    }

    if config.snapshot.path.trim().is_empty() {
        errors.push(ValidationError::EmptySnapshotPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
