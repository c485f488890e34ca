//! URL prober
//!
//! Fetches a URL once and turns the outcome into a [`Measurement`]. Network
//! errors, timeouts and non-2xx responses are not errors here: they become a
//! measurement with `availability = 0` and no size or time.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::Measurement;

/// Upper bound for a single probe, body download included
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Prober {
    /// HTTP client (reused across probes)
    client: reqwest::Client,
}

impl Prober {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self::with_client(client))
    }

    /// Use an existing client; its timeout bounds each probe
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probe `url` and measure the elapsed time and body size
    pub async fn probe(&self, url: &str) -> Measurement {
        let start = Instant::now();

        match self.fetch(url).await {
            Some(size) => Measurement::success(url, size, start.elapsed().as_secs_f64()),
            None => Measurement::failed(url),
        }
    }

    async fn fetch(&self, url: &str) -> Option<u64> {
        let response = self.client.get(url).send().await.ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body = response.bytes().await.ok()?;
        Some(body.len() as u64)
    }
}
