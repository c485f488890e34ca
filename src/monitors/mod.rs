//! Health probing of monitored URLs
//!
//! - [`prober`]: one HTTP fetch of one URL, producing a measurement
//! - [`collector`]: bounded concurrent probing of many URLs

pub mod collector;
pub mod prober;

pub use collector::MetricCollector;
pub use prober::Prober;
