//! Monitoring cycle
//!
//! One invocation runs a complete, self-contained cycle:
//!
//! ```text
//! Idle → Probing → Reconciling → LayoutUpdate | SkipLayout → Publishing → Idle
//! ```
//!
//! 1. Load the resource list (or the built-in defaults if none exists yet)
//! 2. Probe every URL
//! 3. Diff configured alarms against the alarm backend and apply the plan
//! 4. Rewrite the dashboard only if alarms changed
//! 5. Publish one point per configured `(url, metric)` pair
//!
//! Nothing is carried over between cycles. Backend writes only start after
//! probing has completed, and any backend failure aborts the cycle; the next
//! cycle starts again from freshly loaded configuration.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use crate::alarms::{AlarmPlan, AlarmReconciler, AlarmTemplate};
use crate::backends::{AlarmBackend, ConfigSource, DashboardBackend, MetricPoint, MetricsSink};
use crate::config::{MonitorConfig, default_resources};
use crate::dashboard::DashboardPacker;
use crate::error::{MonitorError, MonitorResult};
use crate::monitors::MetricCollector;
use crate::{Measurement, ResourceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    Idle,
    Probing,
    Reconciling,
    LayoutUpdate,
    SkipLayout,
    Publishing,
}

/// Summary of one successful cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Phases passed through, in order, from the initial to the final `Idle`
    pub phases: Vec<CyclePhase>,

    /// The built-in resource list was used because no configuration exists
    pub used_default_resources: bool,

    /// Number of distinct URLs probed
    pub probed: usize,

    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub layout_updated: bool,

    /// Number of metric points published
    pub published: usize,
}

/// The external collaborators a cycle talks to
#[derive(Clone)]
pub struct Backends {
    pub config_source: Arc<dyn ConfigSource>,
    pub alarms: Arc<dyn AlarmBackend>,
    pub metrics: Arc<dyn MetricsSink>,
    pub dashboards: Arc<dyn DashboardBackend>,
}

pub struct MonitoringCycle {
    config: MonitorConfig,
    backends: Backends,
    collector: MetricCollector,
    reconciler: AlarmReconciler,
    packer: DashboardPacker,
}

impl MonitoringCycle {
    pub fn new(config: MonitorConfig, collector: MetricCollector, backends: Backends) -> Self {
        let reconciler = AlarmReconciler::new(AlarmTemplate::from_config(&config));
        let packer = DashboardPacker::new(config.namespace.clone());

        Self {
            config,
            backends,
            collector,
            reconciler,
            packer,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one full cycle
    #[instrument(skip(self), fields(namespace = %self.config.namespace))]
    pub async fn run_once(&self) -> MonitorResult<CycleReport> {
        let started_at = Utc::now();
        let mut phases = vec![CyclePhase::Idle];

        // Configuration is loaded while still idle
        let (resources, used_default_resources) = self.load_resources().await?;

        enter(&mut phases, CyclePhase::Probing);
        let urls: Vec<String> = resources.iter().map(|r| r.url.clone()).collect();
        let measurements = self.collector.collect(&urls).await;

        enter(&mut phases, CyclePhase::Reconciling);
        let plan = self.reconcile_alarms(&resources).await?;

        let layout_updated = !plan.is_empty();
        if layout_updated {
            enter(&mut phases, CyclePhase::LayoutUpdate);
            let widgets = self.packer.pack(&resources);
            self.backends
                .dashboards
                .put_layout(&self.config.dashboard_name, &widgets)
                .await?;
            debug!("dashboard updated with {} widgets", widgets.len());
        } else {
            enter(&mut phases, CyclePhase::SkipLayout);
        }

        enter(&mut phases, CyclePhase::Publishing);
        let points = metric_points(&self.config.namespace, &resources, &measurements, Utc::now());
        self.backends.metrics.publish(&points).await?;

        enter(&mut phases, CyclePhase::Idle);

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            phases,
            used_default_resources,
            probed: measurements.len(),
            created: plan.to_create.into_iter().map(|alarm| alarm.name).collect(),
            deleted: plan.to_delete,
            layout_updated,
            published: points.len(),
        };

        info!(
            "cycle finished: {} probed, {} alarms created, {} deleted, {} points published",
            report.probed,
            report.created.len(),
            report.deleted.len(),
            report.published
        );

        Ok(report)
    }

    async fn load_resources(&self) -> MonitorResult<(Vec<ResourceConfig>, bool)> {
        match self.backends.config_source.load().await {
            Ok(resources) => Ok((resources, false)),
            Err(MonitorError::ConfigUnavailable(reason)) if self.config.fallback_to_defaults => {
                warn!("no resource configuration ({reason}), using built-in defaults");
                Ok((default_resources(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn reconcile_alarms(&self, resources: &[ResourceConfig]) -> MonitorResult<AlarmPlan> {
        let prefix = self.reconciler.template().prefix();
        let existing = self.backends.alarms.list_alarm_names(&prefix).await?;
        let plan = self.reconciler.reconcile(resources, &existing);

        for alarm in &plan.to_create {
            self.backends.alarms.create_alarm(alarm).await?;
        }

        if !plan.to_delete.is_empty() {
            self.backends.alarms.delete_alarms(&plan.to_delete).await?;
        }

        Ok(plan)
    }
}

fn enter(phases: &mut Vec<CyclePhase>, phase: CyclePhase) {
    trace!("entering {phase:?}");
    phases.push(phase);
}

/// Build the points to publish: one per configured `(url, metric)` pair
///
/// Metrics that were measured but not configured for a URL are not
/// published, nor are values a failed probe could not measure.
pub fn metric_points(
    namespace: &str,
    resources: &[ResourceConfig],
    measurements: &HashMap<String, Measurement>,
    timestamp: DateTime<Utc>,
) -> Vec<MetricPoint> {
    let mut seen = HashSet::new();
    let mut points = vec![];

    for resource in resources {
        let Some(measurement) = measurements.get(&resource.url) else {
            continue;
        };

        for metric in &resource.metrics {
            if !seen.insert((resource.url.as_str(), metric.metric_type)) {
                continue;
            }

            let Some(value) = measurement.value(metric.metric_type) else {
                continue;
            };

            points.push(MetricPoint {
                namespace: namespace.to_string(),
                url: resource.url.clone(),
                metric_type: metric.metric_type,
                value,
                unit: metric.metric_type.unit().to_string(),
                timestamp,
            });
        }
    }

    points
}
