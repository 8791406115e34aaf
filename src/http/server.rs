//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Start the ingest workers and stop them after the listener closes
//! - Apply live config reloads
//! - Optional final snapshot on shutdown

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::index::{snapshot, SharedIndex};
use crate::ingest::IngestQueue;
use crate::search::SearchEngine;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub queue: IngestQueue,
    pub engine: Arc<SearchEngine>,
    pub snapshot_path: Arc<str>,
    pub started: Instant,
}

/// HTTP front end of the URL index.
pub struct HttpServer {
    config: ServiceConfig,
    index: SharedIndex,
}

impl HttpServer {
    /// Create a server over `index` (empty, restored, or seeded by the caller).
    pub fn new(config: ServiceConfig, index: SharedIndex) -> Self {
        Self { config, index }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/add", get(handlers::add))
            .route("/search", get(handlers::search))
            .route("/dump", get(handlers::dump))
            .route("/reset", get(handlers::reset))
            .route("/status", get(handlers::status))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires, then drain the ingest queue.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let (queue, workers) = IngestQueue::start(&self.config.ingest, self.index.clone());
        let engine = Arc::new(SearchEngine::new(
            self.index.clone(),
            self.config.search.clone(),
        ));

        let reload = spawn_reload(config_updates, queue.clone(), engine.clone());

        let state = AppState {
            index: self.index.clone(),
            queue,
            engine,
            snapshot_path: Arc::from(self.config.snapshot.path.as_str()),
            started: Instant::now(),
        };
        let router = Self::build_router(&self.config, state);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped, draining ingest queue");

        // The reload task holds the last queue handle outside the router.
        reload.abort();
        let _ = reload.await;
        workers.join().await;

        if self.config.snapshot.dump_on_shutdown {
            let index = self.index.clone();
            let path = PathBuf::from(&self.config.snapshot.path);
            match tokio::task::spawn_blocking(move || snapshot::dump(&index, &path)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Final snapshot failed"),
                Err(e) => tracing::error!(error = %e, "Final snapshot task failed"),
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle to the index this server serves.
    pub fn index(&self) -> &SharedIndex {
        &self.index
    }
}

/// Apply live settings from each reloaded config until the channel closes.
fn spawn_reload(
    mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
    queue: IngestQueue,
    engine: Arc<SearchEngine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(new_config) = config_updates.recv().await {
            engine.update_config(new_config.search);
            queue.set_min_url_len(new_config.ingest.min_url_len);
            tracing::info!(
                default_limit = engine.config().default_limit,
                min_url_len = new_config.ingest.min_url_len,
                "Live settings reloaded"
            );
        }
    })
}
