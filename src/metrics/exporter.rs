//! Prometheus metrics exporter
//!
//! HTTP endpoint for Prometheus scraping.

use anyhow::Result;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;

use super::counters::{MetricsSnapshot, METRICS};
use crate::config::MetricsConfig;

type Field = fn(&MetricsSnapshot) -> u64;

/// Exported counters and the snapshot field each one tracks
const EXPORTED: &[(&str, &str, Field)] = &[
    ("editor_bridge_connections_opened", "Editor connections opened", |s| s.connections_opened),
    ("editor_bridge_connections_closed", "Editor connections closed", |s| s.connections_closed),
    ("editor_bridge_connections_failed", "Failed connect or verify attempts", |s| s.connections_failed),
    ("editor_bridge_exchanges_total", "Command exchanges attempted", |s| s.exchanges_total),
    ("editor_bridge_exchanges_failed", "Command exchanges that failed", |s| s.exchanges_failed),
    ("editor_bridge_pings_total", "Liveness checks attempted", |s| s.pings_total),
    ("editor_bridge_pings_failed", "Liveness checks that failed", |s| s.pings_failed),
    ("editor_bridge_bytes_received", "Total bytes received", |s| s.bytes_received),
    ("editor_bridge_bytes_sent", "Total bytes sent", |s| s.bytes_sent),
    ("editor_bridge_remote_errors", "Error replies from the editor", |s| s.remote_errors),
    ("editor_bridge_timeouts_total", "Reads that hit the deadline", |s| s.timeouts_total),
];

/// Initialize the Prometheus metrics exporter
pub fn init_metrics(config: &MetricsConfig) -> Result<()> {
    for (name, description, _) in EXPORTED {
        describe_counter!(*name, *description);
    }

    PrometheusBuilder::new()
        .with_http_listener(config.bind_addr)
        .install()?;

    // Periodically sync atomic counters to the metrics crate
    tokio::spawn(sync_metrics_task());

    Ok(())
}

/// Background task that pushes counter deltas every second
async fn sync_metrics_task() {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut last_snapshot = MetricsSnapshot::default();

    loop {
        interval.tick().await;

        let snapshot = METRICS.snapshot();
        for (name, _, field) in EXPORTED {
            let delta = field(&snapshot).saturating_sub(field(&last_snapshot));
            if delta > 0 {
                counter!(*name).increment(delta);
            }
        }
        last_snapshot = snapshot;
    }
}
