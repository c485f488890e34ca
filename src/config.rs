use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::trace;

use crate::error::{MonitorError, MonitorResult};
use crate::{MetricSpec, MetricType, ResourceConfig, ResourceList};

/// Settings for the monitoring engine
///
/// Every field has a default, so an empty JSON object (or no file at all)
/// yields a usable configuration. Values can be overridden from the
/// environment with [`MonitorConfig::apply_env_overrides`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Namespace metrics are published under
    #[serde(default = "crate::util::get_default_namespace")]
    pub namespace: String,

    /// Deployment stage, prepended to alarm names (e.g. "Beta")
    #[serde(default)]
    pub stage: String,

    /// Seconds between two monitoring cycles
    #[serde(default = "crate::util::get_default_interval")]
    pub interval_secs: u64,

    #[serde(default = "crate::util::get_default_dashboard_name")]
    pub dashboard_name: String,

    /// Maximum number of probes in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Alarm evaluation period (defaults to the cycle interval)
    pub alarm_period_secs: Option<u64>,

    #[serde(default = "default_evaluation_periods")]
    pub evaluation_periods: u32,

    /// Where alarms should send their notifications
    pub notification_target: Option<String>,

    /// JSON file containing the resource list
    pub resources_file: Option<PathBuf>,

    /// Use the built-in resource list if no configuration exists yet
    #[serde(default = "default_fallback")]
    pub fallback_to_defaults: bool,

    /// Directory dashboard layouts are written to
    pub dashboard_dir: Option<PathBuf>,

    /// Endpoint metric points are POSTed to
    pub metrics_webhook: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            namespace: crate::util::get_default_namespace(),
            stage: String::new(),
            interval_secs: crate::util::get_default_interval(),
            dashboard_name: crate::util::get_default_dashboard_name(),
            concurrency: default_concurrency(),
            probe_timeout_secs: default_probe_timeout(),
            alarm_period_secs: None,
            evaluation_periods: default_evaluation_periods(),
            notification_target: None,
            resources_file: None,
            fallback_to_defaults: default_fallback(),
            dashboard_dir: None,
            metrics_webhook: None,
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_evaluation_periods() -> u32 {
    1
}

fn default_fallback() -> bool {
    true
}

impl MonitorConfig {
    /// Override settings from environment variables
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(namespace) = crate::util::get_namespace() {
            self.namespace = namespace;
        }
        if let Some(stage) = crate::util::get_stage() {
            self.stage = stage;
        }
        if let Some(interval) = crate::util::get_interval() {
            self.interval_secs = interval;
        }
        if let Some(dashboard_name) = crate::util::get_dashboard_name() {
            self.dashboard_name = dashboard_name;
        }
        if let Some(file) = crate::util::get_resources_file() {
            self.resources_file = Some(PathBuf::from(file));
        }
        if let Some(target) = crate::util::get_notification_target() {
            self.notification_target = Some(target);
        }
        self
    }

    /// Namespace alarm names are scoped to: `{stage}-{namespace}`, or just
    /// `{namespace}` without a stage
    pub fn alarm_namespace(&self) -> String {
        if self.stage.is_empty() {
            self.namespace.clone()
        } else {
            format!("{}-{}", self.stage, self.namespace)
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn alarm_period_secs(&self) -> u64 {
        self.alarm_period_secs.unwrap_or(self.interval_secs)
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<MonitorConfig> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}

/// Read a resource list document from disk
///
/// A missing file is reported as [`MonitorError::ConfigUnavailable`].
pub fn read_resources_file(path: &Path) -> MonitorResult<Vec<ResourceConfig>> {
    let file_content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            MonitorError::ConfigUnavailable(format!("{} does not exist", path.display()))
        }
        _ => MonitorError::Io(e),
    })?;

    let list: ResourceList = serde_json::from_str(&file_content)?;
    trace!("loaded {} resources from {}", list.urls.len(), path.display());
    Ok(list.urls)
}

/// Resources monitored when no configuration exists yet
pub fn default_resources() -> Vec<ResourceConfig> {
    vec![ResourceConfig {
        url: "https://www.python.org/".to_string(),
        name: "Welcome to Python.org".to_string(),
        metrics: vec![
            MetricSpec::new(MetricType::Availability, "<1"),
            MetricSpec::new(MetricType::PageTime, ">=1"),
            MetricSpec::new(MetricType::PageSize, ">1"),
        ],
    }]
}
