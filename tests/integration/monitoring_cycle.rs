//! End-to-end tests for the monitoring cycle
//!
//! These tests verify that:
//! - A first cycle creates alarms, writes the dashboard and publishes metrics
//! - An unchanged second cycle skips the dashboard
//! - Configuration changes delete stale alarms and rewrite the dashboard
//! - Backend and configuration failures fail the cycle
//! - A cycle cancelled while probing leaves every backend untouched

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use canary_monitor::MetricType;
use canary_monitor::backends::{MemoryBackend, StaticConfigSource};
use canary_monitor::cycle::CyclePhase;
use canary_monitor::dashboard::WidgetKind;
use canary_monitor::error::MonitorError;
use pretty_assertions::assert_eq;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_first_cycle_creates_everything() {
    let mock_server = start_page("/home", "<html>home</html>").await;
    let url = format!("{}/home", mock_server.uri());
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &url,
        &[
            (MetricType::Availability, "<1"),
            (MetricType::PageTime, ">=1"),
            (MetricType::PageSize, ">1"),
        ],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    let report = cycle.run_once().await.unwrap();

    assert_eq!(
        report.phases,
        vec![
            CyclePhase::Idle,
            CyclePhase::Probing,
            CyclePhase::Reconciling,
            CyclePhase::LayoutUpdate,
            CyclePhase::Publishing,
            CyclePhase::Idle,
        ]
    );
    assert_eq!(report.probed, 1);
    assert_eq!(report.created.len(), 3);
    assert!(report.deleted.is_empty());
    assert!(report.layout_updated);
    assert_eq!(report.published, 3);

    let names = backend.alarm_names().await;
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|name| name.starts_with("Test-Monitor-Alarm-")));
    assert!(names.iter().all(|name| name.contains(&url)));

    let layout = backend.layout("TestDashboard").await.unwrap();
    assert_eq!(layout.len(), 4);
    assert_eq!(layout[0].kind(), WidgetKind::Text);

    let points = backend.points().await;
    let size = points
        .iter()
        .find(|point| point.metric_type == MetricType::PageSize)
        .unwrap();
    assert_eq!(size.value, 17.0);
    assert_eq!(size.namespace, "Monitor");
}

#[tokio::test]
async fn test_unchanged_cycle_skips_layout() {
    let mock_server = start_page("/", "ok").await;
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &mock_server.uri(),
        &[(MetricType::Availability, "<1")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    cycle.run_once().await.unwrap();
    let report = cycle.run_once().await.unwrap();

    assert!(report.created.is_empty());
    assert!(report.deleted.is_empty());
    assert!(!report.layout_updated);
    assert_eq!(
        report.phases,
        vec![
            CyclePhase::Idle,
            CyclePhase::Probing,
            CyclePhase::Reconciling,
            CyclePhase::SkipLayout,
            CyclePhase::Publishing,
            CyclePhase::Idle,
        ]
    );
    assert_eq!(backend.layout_writes(), 1);
    // Only the latest cycle's batch is kept
    assert_eq!(backend.points().await.len(), 1);
}

#[tokio::test]
async fn test_config_change_deletes_stale_alarms() {
    let mock_server = start_page("/", "ok").await;
    let url = mock_server.uri();
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &url,
        &[(MetricType::Availability, "<1"), (MetricType::PageTime, ">2")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source.clone(), backend.clone());
    cycle.run_once().await.unwrap();

    source
        .replace(vec![create_test_resource(&url, &[(MetricType::Availability, "<1")])])
        .await;
    let report = cycle.run_once().await.unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.deleted.len(), 1);
    assert!(report.deleted[0].contains("PageTime"));
    assert!(report.layout_updated);
    assert_eq!(backend.alarm_names().await.len(), 1);
    assert_eq!(backend.layout("TestDashboard").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_threshold_does_not_abort_cycle() {
    let mock_server = start_page("/", "ok").await;
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &mock_server.uri(),
        &[(MetricType::Availability, "abc"), (MetricType::PageSize, ">5")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    let report = cycle.run_once().await.unwrap();

    assert_eq!(report.created.len(), 1);
    // Availability is still published even though it has no alarm
    assert_eq!(report.published, 2);
}

#[tokio::test]
async fn test_unavailable_backend_fails_cycle() {
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        "http://127.0.0.1:9/",
        &[(MetricType::Availability, "<1")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    backend.set_unavailable(true);
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    let result = cycle.run_once().await;

    assert_matches!(result, Err(MonitorError::BackendUnavailable { .. }));
    assert!(backend.points().await.is_empty());

    backend.set_unavailable(false);
    let report = cycle.run_once().await.unwrap();
    assert_eq!(report.created.len(), 1);
}

#[tokio::test]
async fn test_missing_config_fails_without_fallback() {
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(
        create_test_config(),
        Arc::new(StaticConfigSource::empty()),
        backend.clone(),
    );

    assert_matches!(cycle.run_once().await, Err(MonitorError::ConfigUnavailable(_)));
    assert!(backend.alarm_names().await.is_empty());
}

#[tokio::test]
async fn test_missing_config_uses_defaults() {
    let mut config = create_test_config();
    config.fallback_to_defaults = true;
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(config, Arc::new(StaticConfigSource::empty()), backend.clone());

    let report = cycle.run_once().await.unwrap();

    assert!(report.used_default_resources);
    assert_eq!(report.created.len(), 3);
}

#[tokio::test]
async fn test_cancelled_cycle_writes_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &mock_server.uri(),
        &[(MetricType::Availability, "<1"), (MetricType::PageTime, ">2")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    let result = tokio::time::timeout(Duration::from_millis(200), cycle.run_once()).await;

    assert!(result.is_err());
    assert!(backend.alarm_names().await.is_empty());
    assert_eq!(backend.layout_writes(), 0);
    assert!(backend.points().await.is_empty());
}

#[tokio::test]
async fn test_cycle_runs_on_spawned_task() {
    let mock_server = start_page("/", "ok").await;
    let source = Arc::new(StaticConfigSource::new(vec![create_test_resource(
        &mock_server.uri(),
        &[(MetricType::Availability, "<1")],
    )]));
    let backend = Arc::new(MemoryBackend::new());
    let cycle = create_test_cycle(create_test_config(), source, backend.clone());

    let report = tokio::spawn(async move { cycle.run_once().await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.created.len(), 1);
    assert_eq!(backend.alarm_names().await.len(), 1);
}
