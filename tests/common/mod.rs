//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use urlrank::{HttpServer, ServiceConfig, SharedIndex, Shutdown};

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub shutdown: Shutdown,
    pub index: SharedIndex,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(config: ServiceConfig) -> Self {
        Self::start_with(config, SharedIndex::new()).await
    }

    pub async fn start_with(mut config: ServiceConfig, index: SharedIndex) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        config.listener.bind_address = addr.to_string();

        let shutdown = Shutdown::new();
        let (_, config_updates) = mpsc::unbounded_channel();
        let server = HttpServer::new(config, index.clone());
        let server_shutdown = shutdown.subscribe();

        let handle = tokio::spawn(async move {
            let _ = server.run(listener, config_updates, server_shutdown).await;
        });

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        let server = Self {
            addr,
            client,
            shutdown,
            index,
            handle,
        };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&self) {
        for _ in 0..50 {
            if let Ok(res) = self.client.get(self.url("/status")).send().await {
                if res.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server at {} never became ready", self.addr);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> (u16, String) {
        let res = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .expect("server unreachable");
        let status = res.status().as_u16();
        (status, res.text().await.unwrap())
    }

    pub async fn add(&self, url: &str) -> u16 {
        self.get("/add", &[("q", url)]).await.0
    }

    pub async fn status(&self) -> serde_json::Value {
        let (_, body) = self.get("/status", &[("verbose", "1")]).await;
        serde_json::from_str(&body).unwrap()
    }

    /// Poll until the ingest workers have inserted `count` URLs.
    pub async fn wait_inserted(&self, count: u64) {
        for _ in 0..200 {
            let status = self.status().await;
            if status["ingest"]["inserted"].as_u64() >= Some(count) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ingest workers never reached {count} inserts");
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}
