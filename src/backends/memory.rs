//! In-memory backends (no persistence)
//!
//! Useful for:
//! - Testing the monitoring cycle without external services
//! - Running the hub locally before any real backend is wired up
//!
//! [`MemoryBackend`] can be switched into an unavailable state to simulate
//! outages; every call then fails with `BackendUnavailable`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::ResourceConfig;
use crate::alarms::AlarmDescriptor;
use crate::dashboard::DashboardWidget;
use crate::error::{MonitorError, MonitorResult};

use super::backend::{AlarmBackend, ConfigSource, DashboardBackend, MetricPoint, MetricsSink};

/// Alarm store, metrics sink and dashboard store in one
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Alarms keyed by name
    alarms: RwLock<HashMap<String, AlarmDescriptor>>,

    /// Points of the most recent publish only
    points: RwLock<Vec<MetricPoint>>,

    /// Latest layout per dashboard
    dashboards: RwLock<HashMap<String, Vec<DashboardWidget>>>,

    /// Number of layout writes
    layout_writes: AtomicU64,

    unavailable: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert an alarm directly, bypassing availability checks
    pub async fn seed_alarm(&self, alarm: AlarmDescriptor) {
        self.alarms.write().await.insert(alarm.name.clone(), alarm);
    }

    pub async fn alarm_names(&self) -> HashSet<String> {
        self.alarms.read().await.keys().cloned().collect()
    }

    pub async fn alarm(&self, name: &str) -> Option<AlarmDescriptor> {
        self.alarms.read().await.get(name).cloned()
    }

    pub async fn points(&self) -> Vec<MetricPoint> {
        self.points.read().await.clone()
    }

    pub async fn layout(&self, name: &str) -> Option<Vec<DashboardWidget>> {
        self.dashboards.read().await.get(name).cloned()
    }

    pub fn layout_writes(&self) -> u64 {
        self.layout_writes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self, backend: &'static str) -> MonitorResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MonitorError::backend(backend, "in-memory backend marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AlarmBackend for MemoryBackend {
    async fn list_alarm_names(&self, prefix: &str) -> MonitorResult<HashSet<String>> {
        self.ensure_available("alarm")?;

        let alarms = self.alarms.read().await;
        Ok(alarms
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn create_alarm(&self, alarm: &AlarmDescriptor) -> MonitorResult<()> {
        self.ensure_available("alarm")?;

        debug!("creating alarm {}", alarm.name);
        self.alarms
            .write()
            .await
            .insert(alarm.name.clone(), alarm.clone());
        Ok(())
    }

    async fn delete_alarms(&self, names: &[String]) -> MonitorResult<()> {
        self.ensure_available("alarm")?;

        let mut alarms = self.alarms.write().await;
        for name in names {
            debug!("deleting alarm {name}");
            alarms.remove(name);
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSink for MemoryBackend {
    async fn publish(&self, points: &[MetricPoint]) -> MonitorResult<()> {
        self.ensure_available("metrics")?;

        *self.points.write().await = points.to_vec();
        Ok(())
    }
}

#[async_trait]
impl DashboardBackend for MemoryBackend {
    async fn put_layout(&self, name: &str, widgets: &[DashboardWidget]) -> MonitorResult<()> {
        self.ensure_available("dashboard")?;

        self.dashboards
            .write()
            .await
            .insert(name.to_string(), widgets.to_vec());
        self.layout_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration source backed by a fixed resource list
#[derive(Debug, Default)]
pub struct StaticConfigSource {
    /// `None` behaves as if no configuration existed yet
    resources: RwLock<Option<Vec<ResourceConfig>>>,
}

impl StaticConfigSource {
    pub fn new(resources: Vec<ResourceConfig>) -> Self {
        Self {
            resources: RwLock::new(Some(resources)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the resource list served by subsequent loads
    pub async fn replace(&self, resources: Vec<ResourceConfig>) {
        *self.resources.write().await = Some(resources);
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn load(&self) -> MonitorResult<Vec<ResourceConfig>> {
        self.resources
            .read()
            .await
            .clone()
            .ok_or_else(|| MonitorError::ConfigUnavailable("no resources configured".to_string()))
    }
}
