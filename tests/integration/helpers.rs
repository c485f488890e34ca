//! Helper functions for integration tests

use std::sync::Arc;
use std::time::Duration;

use canary_monitor::backends::{MemoryBackend, StaticConfigSource};
use canary_monitor::config::MonitorConfig;
use canary_monitor::cycle::{Backends, MonitoringCycle};
use canary_monitor::monitors::{MetricCollector, Prober};
use canary_monitor::{MetricSpec, MetricType, ResourceConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn create_test_resource(url: &str, metrics: &[(MetricType, &str)]) -> ResourceConfig {
    ResourceConfig {
        url: url.to_string(),
        name: format!("Test {url}"),
        metrics: metrics
            .iter()
            .map(|(metric_type, threshold)| MetricSpec::new(*metric_type, *threshold))
            .collect(),
    }
}

pub fn create_test_collector(timeout_secs: u64) -> MetricCollector {
    let prober = Prober::new(Duration::from_secs(timeout_secs)).unwrap();
    MetricCollector::new(prober, 5)
}

pub fn create_test_config() -> MonitorConfig {
    MonitorConfig {
        namespace: "Monitor".to_string(),
        stage: "Test".to_string(),
        dashboard_name: "TestDashboard".to_string(),
        probe_timeout_secs: 1,
        fallback_to_defaults: false,
        ..MonitorConfig::default()
    }
}

/// Cycle wired to a static config source and a shared in-memory backend
pub fn create_test_cycle(
    config: MonitorConfig,
    source: Arc<StaticConfigSource>,
    backend: Arc<MemoryBackend>,
) -> MonitoringCycle {
    let collector = create_test_collector(config.probe_timeout_secs);
    let backends = Backends {
        config_source: source,
        alarms: backend.clone(),
        metrics: backend.clone(),
        dashboards: backend,
    };
    MonitoringCycle::new(config, collector, backends)
}

/// Mock server answering `GET {route}` with `body`
pub async fn start_page(route: &str, body: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;
    mock_server
}
