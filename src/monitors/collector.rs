//! Metric collector
//!
//! Runs the [`Prober`] over a list of URLs with a bounded number of probes in
//! flight and gathers the results into a map keyed by URL.
//!
//! ## Cancellation
//!
//! Results are only returned once every probe has finished. Dropping the
//! future returned by [`MetricCollector::collect`] abandons in-flight probes
//! and discards whatever was gathered so far.
//!
//! ## Duplicate URLs
//!
//! Each URL is keyed once; if the same URL is listed twice, whichever probe
//! finishes last wins.

use std::collections::HashMap;

use futures::StreamExt;
use futures::stream;
use tracing::{debug, instrument, trace};

use crate::Measurement;
use crate::config::MonitorConfig;

use super::prober::Prober;

/// Default number of probes in flight
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone)]
pub struct MetricCollector {
    prober: Prober,
    concurrency: usize,
}

impl MetricCollector {
    pub fn new(prober: Prober, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> anyhow::Result<Self> {
        let prober = Prober::new(config.probe_timeout())?;
        Ok(Self::new(prober, config.concurrency))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every URL and return one measurement per distinct URL
    #[instrument(skip_all, fields(targets = urls.len()))]
    pub async fn collect(&self, urls: &[String]) -> HashMap<String, Measurement> {
        trace!("probing with up to {} concurrent requests", self.concurrency);

        let prober = self.prober.clone();
        let measurements: Vec<Measurement> = stream::iter(urls.to_vec())
            .map(move |url| {
                let prober = prober.clone();
                async move { prober.probe(&url).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut results = HashMap::with_capacity(measurements.len());
        for measurement in measurements {
            if measurement.is_available() {
                trace!(
                    "{}: size={:?} elapsed={:?}s",
                    measurement.url, measurement.page_size_bytes, measurement.response_time_seconds
                );
            } else {
                debug!("{}: unavailable", measurement.url);
            }
            results.insert(measurement.url.clone(), measurement);
        }

        results
    }
}
