//! External collaborators of the monitoring cycle
//!
//! ## Design
//!
//! - **Trait-based**: the cycle only sees [`ConfigSource`], [`AlarmBackend`],
//!   [`MetricsSink`] and [`DashboardBackend`]
//! - **Async**: every call is async so providers can use the network
//!
//! ## Providers
//!
//! - **Memory**: alarms, metrics and dashboards kept in process (testing, local runs)
//! - **File**: resource list read from JSON, dashboards written as JSON
//! - **Webhook**: metric points POSTed to an HTTP endpoint

pub mod backend;
pub mod file;
pub mod memory;
pub mod webhook;

pub use backend::{AlarmBackend, ConfigSource, DashboardBackend, MetricPoint, MetricsSink};
pub use file::{FileConfigSource, FileDashboardBackend};
pub use memory::{MemoryBackend, StaticConfigSource};
pub use webhook::WebhookMetricsSink;
