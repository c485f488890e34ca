//! Alarm reconciliation
//!
//! Alarm identity is recomputed from configuration on every cycle: the name of
//! an alarm is a pure function of `(namespace, metric, url, threshold segment)`.
//! Reconciling is therefore a plain set difference between the names the
//! configuration asks for and the names the backend already has.
//!
//! The reconciler never talks to a backend itself; it only produces an
//! [`AlarmPlan`] which the monitoring cycle applies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{trace, warn};

use crate::config::MonitorConfig;
use crate::{MetricType, ResourceConfig};

use super::threshold::{self, ThresholdRule};

/// Number of digest bytes kept in an alarm name (16 hex characters)
const DIGEST_BYTES: usize = 8;

/// Everything a backend needs to create one threshold alarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmDescriptor {
    pub name: String,
    pub url: String,
    pub metric_type: MetricType,
    pub rule: ThresholdRule,

    /// Namespace the watched metric is published under
    pub namespace: String,

    pub period_secs: u64,
    pub evaluation_periods: u32,

    /// Notification targets triggered when the threshold is crossed
    pub actions: Vec<String>,
}

/// Settings shared by all alarms of one deployment
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmTemplate {
    /// Namespace alarm names are scoped to (`{stage}-{namespace}`)
    pub alarm_namespace: String,

    /// Namespace the metrics are published under
    pub metric_namespace: String,

    pub period_secs: u64,
    pub evaluation_periods: u32,
    pub actions: Vec<String>,
}

impl AlarmTemplate {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            alarm_namespace: namespace.clone(),
            metric_namespace: namespace,
            period_secs: crate::util::get_default_interval(),
            evaluation_periods: 1,
            actions: vec![],
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            alarm_namespace: config.alarm_namespace(),
            metric_namespace: config.namespace.clone(),
            period_secs: config.alarm_period_secs(),
            evaluation_periods: config.evaluation_periods,
            actions: config.notification_target.iter().cloned().collect(),
        }
    }

    /// Prefix shared by every alarm this deployment owns
    pub fn prefix(&self) -> String {
        alarm_prefix(&self.alarm_namespace)
    }
}

/// Outcome of a reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmPlan {
    /// Alarms that are configured but missing in the backend (configuration order)
    pub to_create: Vec<AlarmDescriptor>,

    /// Backend alarms that are no longer configured (sorted)
    pub to_delete: Vec<String>,
}

impl AlarmPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

pub fn alarm_prefix(alarm_namespace: &str) -> String {
    format!("{alarm_namespace}-Alarm-")
}

/// Whether `name` is shaped like an alarm [`alarm_name`] built for `alarm_namespace`
///
/// A bare prefix match is not enough: the names of a namespace such as
/// `Monitor-Alarm-Prod` also start with `Monitor-Alarm-`.
pub fn is_own_alarm(alarm_namespace: &str, name: &str) -> bool {
    let Some(rest) = name.strip_prefix(&alarm_prefix(alarm_namespace)) else {
        return false;
    };
    let Some((rest, digest)) = rest.rsplit_once('-') else {
        return false;
    };
    if digest.len() != DIGEST_BYTES * 2
        || !digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return false;
    }

    MetricType::ALL.iter().any(|metric_type| {
        rest.strip_prefix(metric_type.as_str())
            .and_then(|url| url.strip_prefix('-'))
            .is_some_and(|url| !url.is_empty())
    })
}

/// Compute the name of an alarm from its defining fields
///
/// The same inputs always produce the same name. The readable part keeps the
/// metric and URL visible; the digest keeps names unique per threshold segment.
pub fn alarm_name(
    alarm_namespace: &str,
    metric_type: MetricType,
    url: &str,
    source_expression: &str,
) -> String {
    let mut hasher = Sha256::new();
    for field in [alarm_namespace, metric_type.as_str(), url, source_expression] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    let digest: String = hasher.finalize()[..DIGEST_BYTES]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();

    format!(
        "{}{}-{}-{}",
        alarm_prefix(alarm_namespace),
        metric_type.as_str(),
        url,
        digest
    )
}

#[derive(Debug, Clone)]
pub struct AlarmReconciler {
    template: AlarmTemplate,
}

impl AlarmReconciler {
    pub fn new(template: AlarmTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &AlarmTemplate {
        &self.template
    }

    /// All alarms the configuration asks for, deduplicated by name
    ///
    /// Metrics whose threshold expression does not parse are skipped (they
    /// simply have no alarm); this never fails the whole computation.
    pub fn desired(&self, resources: &[ResourceConfig]) -> Vec<AlarmDescriptor> {
        let mut seen = HashSet::new();
        let mut desired = vec![];

        for resource in resources {
            for metric in &resource.metrics {
                let rules = match threshold::parse(&metric.threshold_expression) {
                    Ok(rules) => rules,
                    Err(e) => {
                        warn!("{}: skipping {} alarms: {e}", resource.url, metric.metric_type);
                        continue;
                    }
                };

                for rule in rules {
                    let descriptor = self.describe(resource, metric.metric_type, rule);
                    if seen.insert(descriptor.name.clone()) {
                        desired.push(descriptor);
                    }
                }
            }
        }

        desired
    }

    /// Diff the configured alarms against the names present in the backend
    ///
    /// Existing names that this deployment could not have created are never
    /// scheduled for deletion.
    pub fn reconcile(&self, resources: &[ResourceConfig], existing: &HashSet<String>) -> AlarmPlan {
        let desired = self.desired(resources);
        let desired_names: HashSet<&str> = desired.iter().map(|alarm| alarm.name.as_str()).collect();
        let namespace = &self.template.alarm_namespace;

        let mut to_delete: Vec<String> = existing
            .iter()
            .filter(|name| {
                is_own_alarm(namespace, name) && !desired_names.contains(name.as_str())
            })
            .cloned()
            .collect();
        to_delete.sort();

        let to_create: Vec<AlarmDescriptor> = desired
            .into_iter()
            .filter(|alarm| !existing.contains(&alarm.name))
            .collect();

        trace!(
            "reconciled alarms: {} to create, {} to delete",
            to_create.len(),
            to_delete.len()
        );

        AlarmPlan {
            to_create,
            to_delete,
        }
    }

    fn describe(
        &self,
        resource: &ResourceConfig,
        metric_type: MetricType,
        rule: ThresholdRule,
    ) -> AlarmDescriptor {
        AlarmDescriptor {
            name: alarm_name(
                &self.template.alarm_namespace,
                metric_type,
                &resource.url,
                &rule.source_expression,
            ),
            url: resource.url.clone(),
            metric_type,
            rule,
            namespace: self.template.metric_namespace.clone(),
            period_secs: self.template.period_secs,
            evaluation_periods: self.template.evaluation_periods,
            actions: self.template.actions.clone(),
        }
    }
}
