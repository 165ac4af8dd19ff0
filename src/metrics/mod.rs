//! Metrics and observability
//!
//! Atomic counters updated by the bridge, with an optional Prometheus exporter.

mod counters;
mod exporter;

pub use counters::*;
pub use exporter::init_metrics;
