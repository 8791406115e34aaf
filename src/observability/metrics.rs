//! Metrics collection and exposition.
//!
//! # Metrics
//! - `urlrank_admissions_total` (counter): admission attempts by outcome
//! - `urlrank_inserts_total` (counter): URLs written into the index
//! - `urlrank_index_keys` (gauge): distinct keys after the last insert
//! - `urlrank_searches_total` (counter): searches served
//! - `urlrank_search_results` (histogram): matching entries per search
//! - `urlrank_search_duration_seconds` (histogram): search latency
//! - `urlrank_snapshots_total` (counter): snapshot dumps by outcome
//! - `urlrank_resets_total` (counter): index wipes
//!
//! Recording is a no-op until `init_metrics` installs a recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(outcome: &'static str) {
    metrics::counter!("urlrank_admissions_total", "outcome" => outcome).increment(1);
}

pub fn record_insert(keys: usize) {
    metrics::counter!("urlrank_inserts_total").increment(1);
    metrics::gauge!("urlrank_index_keys").set(keys as f64);
}

pub fn record_search(matches: usize, start: Instant) {
    metrics::counter!("urlrank_searches_total").increment(1);
    metrics::histogram!("urlrank_search_results").record(matches as f64);
    metrics::histogram!("urlrank_search_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_snapshot(outcome: &'static str) {
    metrics::counter!("urlrank_snapshots_total", "outcome" => outcome).increment(1);
}

pub fn record_reset() {
    metrics::counter!("urlrank_resets_total").increment(1);
    metrics::gauge!("urlrank_index_keys").set(0.0);
}
