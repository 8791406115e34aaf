//! End-to-end tests of the HTTP surface.

use urlrank::index::snapshot;
use urlrank::{ServiceConfig, SharedIndex};

mod common;
use common::TestServer;

async fn seeded_server(config: ServiceConfig) -> TestServer {
    let server = TestServer::start(config).await;
    for _ in 0..3 {
        assert_eq!(server.add("http://a.example.com/x").await, 200);
    }
    assert_eq!(server.add("http://b.example.com/y").await, 200);
    server.wait_inserted(4).await;
    server
}

#[tokio::test]
async fn test_ranked_prefix_search() {
    let server = seeded_server(ServiceConfig::default()).await;

    let (status, body) = server.get("/search", &[("q", "example.com")]).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        "Total Num:2 Total PV:4\nhttp://a.example.com/x\t3\nhttp://b.example.com/y\t1"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_regex_filter_narrows_candidates() {
    let server = seeded_server(ServiceConfig::default()).await;

    let (_, body) = server
        .get("/search", &[("q", r"example\.com(/x)?$"), ("json", "1")])
        .await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["err_code"], 0);
    assert_eq!(value["totalNum"], 1);
    assert_eq!(value["totalPV"], 3);
    assert_eq!(value["data"][0]["Key"], "http://a.example.com/x");
    assert_eq!(value["data"][0]["Value"], 3);

    // Unanchored, the empty optional group lets the b URL through as well.
    let (_, body) = server
        .get("/search", &[("q", r"example\.com(/x)?"), ("json", "1")])
        .await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["totalNum"], 2);

    server.stop().await;
}

#[tokio::test]
async fn test_short_urls_are_never_indexed() {
    let server = TestServer::start(ServiceConfig::default()).await;

    assert_eq!(server.add("ab").await, 200);
    assert_eq!(server.add("http://c.example.com/").await, 200);
    server.wait_inserted(1).await;

    let (_, body) = server.get("/search", &[("q", "ab")]).await;
    assert_eq!(body, "Total Num:0 Total PV:0\n");

    let status = server.status().await;
    assert_eq!(status["ingest"]["dropped"], 1);
    assert_eq!(status["index"]["keys"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_limit_and_bad_regex() {
    let server = seeded_server(ServiceConfig::default()).await;

    let (_, body) = server.get("/search", &[("q", "example.com"), ("n", "1")]).await;
    assert_eq!(body, "Total Num:2 Total PV:4\nhttp://a.example.com/x\t3");

    let (_, body) = server.get("/search", &[("q", "example.com"), ("n", "-3")]).await;
    assert_eq!(body.lines().count(), 3);

    let (status, body) = server.get("/search", &[("q", "example.com(")]).await;
    assert_eq!(status, 200);
    assert_eq!(body, "Total Num:0 Total PV:0\n");

    server.stop().await;
}

#[tokio::test]
async fn test_reset_wipes_index() {
    let server = seeded_server(ServiceConfig::default()).await;

    let (status, body) = server.get("/reset", &[]).await;
    assert_eq!((status, body.as_str()), (200, "ok\n"));

    let (_, body) = server.get("/search", &[("q", "example.com")]).await;
    assert_eq!(body, "Total Num:0 Total PV:0\n");
    assert_eq!(server.status().await["index"]["keys"], 0);

    // The index keeps accepting writes after a wipe.
    assert_eq!(server.add("http://d.example.com/z").await, 200);
    server.wait_inserted(5).await;
    assert_eq!(server.status().await["index"]["keys"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_dump_then_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.db");

    let mut config = ServiceConfig::default();
    config.snapshot.path = path.display().to_string();
    let server = seeded_server(config.clone()).await;

    let (status, body) = server.get("/dump", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body, format!("dump to file: {}\n", path.display()));
    server.stop().await;

    let restored = SharedIndex::from_trie(snapshot::load(&path).unwrap());
    let server = TestServer::start_with(config, restored).await;
    let (_, body) = server.get("/search", &[("q", "example.com")]).await;
    assert_eq!(
        body,
        "Total Num:2 Total PV:4\nhttp://a.example.com/x\t3\nhttp://b.example.com/y\t1"
    );
    server.stop().await;
}

#[tokio::test]
async fn test_dump_on_shutdown_drains_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("final.db");

    let mut config = ServiceConfig::default();
    config.snapshot.path = path.display().to_string();
    config.snapshot.dump_on_shutdown = true;

    let server = TestServer::start(config).await;
    for i in 0..20 {
        assert_eq!(server.add(&format!("http://host{i}.example.com/")).await, 200);
    }
    server.stop().await;

    let trie = snapshot::load(&path).unwrap();
    assert_eq!(trie.len(), 20);
    assert_eq!(trie.hits(), 20);
}

#[tokio::test]
async fn test_status_probe() {
    let server = TestServer::start(ServiceConfig::default()).await;

    let (status, body) = server.get("/status", &[]).await;
    assert_eq!((status, body.as_str()), (200, "ok\n"));

    let status = server.status().await;
    assert_eq!(status["status"], "ok");
    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(status["pending"], 0);

    server.stop().await;
}
