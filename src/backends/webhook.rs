use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{instrument, trace};

use crate::error::{MonitorError, MonitorResult};

use super::backend::{MetricPoint, MetricsSink};

/// Publishes metric points by POSTing them as JSON to a URL
#[derive(Debug, Clone)]
pub struct WebhookMetricsSink {
    client: Client,
    url: String,
}

impl WebhookMetricsSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl MetricsSink for WebhookMetricsSink {
    #[instrument(skip(self, points), fields(points = points.len()))]
    async fn publish(&self, points: &[MetricPoint]) -> MonitorResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let payload = json!({ "metrics": points });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::backend("metrics", e.to_string()))?;

        if !response.status().is_success() {
            return Err(MonitorError::backend(
                "metrics",
                format!("webhook responded with {}", response.status()),
            ));
        }

        trace!("published {} metric points", points.len());
        Ok(())
    }
}
