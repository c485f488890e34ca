pub mod alarms;
pub mod backends;
pub mod config;
pub mod cycle;
pub mod dashboard;
pub mod error;
pub mod monitors;
pub mod scheduler;
pub mod util;

use serde::{Deserialize, Serialize};

/// Kind of measurement that can be tracked (and alarmed on) for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricType {
    Availability,
    #[serde(rename = "Page Time", alias = "PageTime")]
    PageTime,
    #[serde(rename = "Page Size", alias = "PageSize")]
    PageSize,
}

impl MetricType {
    pub const ALL: [MetricType; 3] = [
        MetricType::Availability,
        MetricType::PageTime,
        MetricType::PageSize,
    ];

    /// Stable identifier, used in alarm names and as the published metric name
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Availability => "Availability",
            MetricType::PageTime => "PageTime",
            MetricType::PageSize => "PageSize",
        }
    }

    /// Human readable label for dashboards
    pub fn label(&self) -> &'static str {
        match self {
            MetricType::Availability => "Availability",
            MetricType::PageTime => "Page Time",
            MetricType::PageSize => "Page Size",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::Availability => "None",
            MetricType::PageTime => "Seconds",
            MetricType::PageSize => "Bytes",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric configured for a resource, with its (possibly empty) threshold expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Comma separated comparisons, e.g. `"<1,>=0.5"`
    #[serde(rename = "threshold", default)]
    pub threshold_expression: String,
}

impl MetricSpec {
    pub fn new(metric_type: MetricType, threshold_expression: impl Into<String>) -> Self {
        Self {
            metric_type,
            threshold_expression: threshold_expression.into(),
        }
    }
}

/// One monitored URL together with its metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub url: String,

    /// Display name (falls back to the URL when not configured)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

impl ResourceConfig {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

/// Wire format of a resource list document (`{"urls": [...]}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceList {
    pub urls: Vec<ResourceConfig>,
}

/// Result of probing one URL
///
/// A failed probe is still a measurement: `availability` is 0 and both
/// `page_size_bytes` and `response_time_seconds` are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub url: String,
    pub availability: u8,
    pub page_size_bytes: Option<u64>,
    pub response_time_seconds: Option<f64>,
}

impl Measurement {
    pub fn success(url: impl Into<String>, page_size_bytes: u64, response_time_seconds: f64) -> Self {
        Self {
            url: url.into(),
            availability: 1,
            page_size_bytes: Some(page_size_bytes),
            response_time_seconds: Some(response_time_seconds),
        }
    }

    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            availability: 0,
            page_size_bytes: None,
            response_time_seconds: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability == 1
    }

    /// Value of the given metric, `None` if the probe could not measure it
    pub fn value(&self, metric_type: MetricType) -> Option<f64> {
        match metric_type {
            MetricType::Availability => Some(f64::from(self.availability)),
            MetricType::PageTime => self.response_time_seconds,
            MetricType::PageSize => self.page_size_bytes.map(|size| size as f64),
        }
    }
}
