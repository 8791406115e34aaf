//! Concurrent admissions against a live server.

use std::sync::Arc;

use urlrank::ServiceConfig;

mod common;
use common::TestServer;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_are_all_counted() {
    let mut config = ServiceConfig::default();
    config.ingest.queue_capacity = 10_000;
    let server = Arc::new(TestServer::start(config).await);

    let mut tasks = Vec::new();
    for producer in 0..8 {
        let server = server.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..25 {
                let url = format!("http://p{producer}.example.com/{}", i % 5);
                assert_eq!(server.add(&url).await, 200);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    server.wait_inserted(200).await;

    let (_, body) = server
        .get("/search", &[("q", "example.com"), ("n", "100")])
        .await;
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("Total Num:40 Total PV:200"));
    assert!(lines.all(|line| line.ends_with("\t5")));

    let server = Arc::into_inner(server).unwrap();
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_during_ingest_keeps_counts_consistent() {
    let server = Arc::new(TestServer::start(ServiceConfig::default()).await);

    let producer = {
        let server = server.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                server.add(&format!("http://h{}.example.com/", i % 10)).await;
            }
        })
    };
    for _ in 0..5 {
        let (status, _) = server.get("/reset", &[]).await;
        assert_eq!(status, 200);
        tokio::task::yield_now().await;
    }
    producer.await.unwrap();

    let status = server.status().await;
    let queued = status["ingest"]["queued"].as_u64().unwrap();
    server.wait_inserted(queued).await;

    // Whatever survived the last reset is internally consistent.
    let (_, body) = server
        .get("/search", &[("q", "example.com"), ("n", "100")])
        .await;
    let mut lines = body.lines();
    let header = lines.next().unwrap().to_string();
    let counts: Vec<u64> = lines
        .map(|line| line.rsplit('\t').next().unwrap().parse().unwrap())
        .collect();
    let hits: u64 = counts.iter().sum();
    assert_eq!(header, format!("Total Num:{} Total PV:{}", counts.len(), hits));
    assert_eq!(server.index.stats().hits, hits);

    let server = Arc::into_inner(server).unwrap();
    server.stop().await;
}
