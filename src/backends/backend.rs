//! Collaborator traits used by the monitoring cycle
//!
//! The cycle only depends on these narrow interfaces; concrete providers
//! (cloud APIs, files, in-memory stores) live behind them.
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync` as they are shared with the
//! scheduler task through `Arc`s.
//!
//! ## Error Handling
//!
//! Write failures must be reported as
//! [`MonitorError::BackendUnavailable`](crate::error::MonitorError::BackendUnavailable);
//! they fail the current cycle.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarms::AlarmDescriptor;
use crate::dashboard::DashboardWidget;
use crate::error::MonitorResult;
use crate::{MetricType, ResourceConfig};

/// One published data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub namespace: String,
    pub url: String,
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Source of the resource list
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load the current resource list
    ///
    /// Must fail with `ConfigUnavailable` if no configuration exists.
    async fn load(&self) -> MonitorResult<Vec<ResourceConfig>>;
}

/// Store of threshold alarms
#[async_trait]
pub trait AlarmBackend: Send + Sync {
    /// Names of all existing alarms starting with `prefix`
    async fn list_alarm_names(&self, prefix: &str) -> MonitorResult<HashSet<String>>;

    async fn create_alarm(&self, alarm: &AlarmDescriptor) -> MonitorResult<()>;

    async fn delete_alarms(&self, names: &[String]) -> MonitorResult<()>;
}

/// Destination for metric points
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn publish(&self, points: &[MetricPoint]) -> MonitorResult<()>;
}

/// Store of dashboard layouts
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Replace the layout of dashboard `name`
    async fn put_layout(&self, name: &str, widgets: &[DashboardWidget]) -> MonitorResult<()>;
}
