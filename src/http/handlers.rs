//! Route handlers.
//!
//! Handlers only translate between HTTP and the index/ingest/search
//! subsystems. Anything that scans the index or touches disk runs on the
//! blocking pool.

use std::path::PathBuf;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::render;
use crate::http::server::AppState;
use crate::index::{snapshot, IndexStats};
use crate::ingest::{Admission, IngestCounters};
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct AddParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub n: Option<String>,
    pub json: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub verbose: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub index: IndexStats,
    pub ingest: IngestCounters,
    pub pending: usize,
}

/// `GET /add?q=<url>`: queue a URL for counting.
pub async fn add(State(state): State<AppState>, Query(params): Query<AddParams>) -> Response {
    match state.queue.admit(params.q) {
        Admission::Queued | Admission::Dropped => StatusCode::OK.into_response(),
        Admission::Rejected => {
            (StatusCode::SERVICE_UNAVAILABLE, "ingest queue full\n").into_response()
        }
        Admission::Closed => {
            (StatusCode::SERVICE_UNAVAILABLE, "ingest queue closed\n").into_response()
        }
    }
}

/// `GET /search?q=&n=&json=`: ranked prefix + regex search.
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let engine = state.engine.clone();
    let SearchParams { q, n, json } = params;

    let result = match tokio::task::spawn_blocking(move || engine.search(&q, n.as_deref())).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Search task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "search failed\n").into_response();
        }
    };

    if json.as_deref() == Some("1") {
        Json(render::json(&result)).into_response()
    } else {
        render::text(&result).into_response()
    }
}

/// `GET /dump`: write the index to the configured snapshot path.
pub async fn dump(State(state): State<AppState>) -> Response {
    let index = state.index.clone();
    let path = PathBuf::from(&*state.snapshot_path);
    let start = Instant::now();

    let outcome = tokio::task::spawn_blocking(move || snapshot::dump(&index, &path)).await;
    match outcome {
        Ok(Ok(summary)) => {
            metrics::record_snapshot("ok");
            tracing::info!(
                keys = summary.keys,
                bytes = summary.bytes,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Dump complete"
            );
            format!("dump to file: {}\n", state.snapshot_path).into_response()
        }
        Ok(Err(e)) => {
            metrics::record_snapshot("error");
            tracing::error!(error = %e, "Dump failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("dump failed: {e}\n")).into_response()
        }
        Err(e) => {
            metrics::record_snapshot("error");
            tracing::error!(error = %e, "Dump task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "dump failed\n").into_response()
        }
    }
}

/// `GET /reset`: discard the whole index.
pub async fn reset(State(state): State<AppState>) -> &'static str {
    let before = state.index.stats();
    state.index.reset();
    metrics::record_reset();
    tracing::warn!(keys = before.keys, hits = before.hits, "Index wiped");
    "ok\n"
}

/// `GET /status`: liveness probe; `verbose=1` adds counters.
pub async fn status(State(state): State<AppState>, Query(params): Query<StatusParams>) -> Response {
    if params.verbose.as_deref() != Some("1") {
        return "ok\n".into_response();
    }

    Json(StatusReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        index: state.index.stats(),
        ingest: state.queue.stats().snapshot(),
        pending: state.queue.pending(),
    })
    .into_response()
}
