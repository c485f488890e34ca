//! Integration tests for probing and collection
//!
//! These tests verify that:
//! - Every URL yields exactly one measurement
//! - Timeouts and errors become null-valued measurements
//! - Probes run concurrently up to the configured limit

use std::time::{Duration, Instant};

use canary_monitor::Measurement;
use canary_monitor::monitors::{MetricCollector, Prober};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_collect_with_one_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/also-fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("also fast"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_string("slow"),
        )
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = ["/fast", "/also-fast", "/slow"]
        .iter()
        .map(|route| format!("{}{route}", mock_server.uri()))
        .collect();

    let results = create_test_collector(1).collect(&urls).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[&urls[0]].availability, 1);
    assert_eq!(results[&urls[0]].page_size_bytes, Some(4));
    assert_eq!(results[&urls[1]].page_size_bytes, Some(9));
    assert_eq!(results[&urls[2]], Measurement::failed(urls[2].clone()));
}

#[tokio::test]
async fn test_collect_with_unreachable_host() {
    let mock_server = start_page("/ok", "ok").await;
    let urls = vec![
        format!("{}/ok", mock_server.uri()),
        "http://127.0.0.1:9/".to_string(),
    ];

    let results = create_test_collector(1).collect(&urls).await;

    assert_eq!(results.len(), 2);
    assert!(results[&urls[0]].is_available());
    assert!(!results[&urls[1]].is_available());
    assert!(results[&urls[1]].response_time_seconds.is_none());
}

#[tokio::test]
async fn test_probes_run_concurrently() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_string("ok"),
        )
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..5)
        .map(|i| format!("{}/page/{i}", mock_server.uri()))
        .collect();

    let start = Instant::now();
    let results = create_test_collector(5).collect(&urls).await;

    assert_eq!(results.len(), 5);
    assert!(results.values().all(Measurement::is_available));
    // Five 500ms probes in parallel finish well before 2.5s
    assert!(start.elapsed() < Duration::from_millis(2000));
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_string("ok"),
        )
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..4)
        .map(|i| format!("{}/page/{i}", mock_server.uri()))
        .collect();
    let collector = MetricCollector::new(Prober::new(Duration::from_secs(5)).unwrap(), 2);

    let start = Instant::now();
    let results = collector.collect(&urls).await;

    assert_eq!(results.len(), 4);
    // Two batches of two probes each
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_duplicate_urls_collapse_to_one_entry() {
    let mock_server = start_page("/dup", "dup").await;
    let url = format!("{}/dup", mock_server.uri());

    let results = create_test_collector(1)
        .collect(&[url.clone(), url.clone()])
        .await;

    assert_eq!(results.len(), 1);
    assert!(results[&url].is_available());
}
