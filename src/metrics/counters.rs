//! Atomic counters for bridge metrics
//!
//! Lock-free counters that can be safely updated from any task.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics instance
pub static METRICS: Metrics = Metrics::new();

/// Atomic metrics counters
pub struct Metrics {
    // Connection metrics
    pub connections_opened: AtomicU64,
    pub connections_closed: AtomicU64,
    pub connections_failed: AtomicU64,

    // Exchange metrics
    pub exchanges_total: AtomicU64,
    pub exchanges_failed: AtomicU64,
    pub pings_total: AtomicU64,
    pub pings_failed: AtomicU64,

    // Traffic metrics
    pub bytes_received: AtomicU64,
    pub bytes_sent: AtomicU64,

    // Error metrics
    pub remote_errors: AtomicU64,
    pub timeouts_total: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            connections_opened: AtomicU64::new(0),
            connections_closed: AtomicU64::new(0),
            connections_failed: AtomicU64::new(0),
            exchanges_total: AtomicU64::new(0),
            exchanges_failed: AtomicU64::new(0),
            pings_total: AtomicU64::new(0),
            pings_failed: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            remote_errors: AtomicU64::new(0),
            timeouts_total: AtomicU64::new(0),
        }
    }

    // Connection tracking
    #[inline]
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn connection_failed(&self) {
        self.connections_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Exchange tracking
    #[inline]
    pub fn exchange(&self) {
        self.exchanges_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn exchange_failed(&self) {
        self.exchanges_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn ping(&self) {
        self.pings_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn ping_failed(&self) {
        self.pings_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Traffic tracking
    #[inline]
    pub fn bytes_rx(&self, count: u64) {
        self.bytes_received.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn bytes_tx(&self, count: u64) {
        self.bytes_sent.fetch_add(count, Ordering::Relaxed);
    }

    // Error tracking
    #[inline]
    pub fn remote_error(&self) {
        self.remote_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn timeout(&self) {
        self.timeouts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            connections_failed: self.connections_failed.load(Ordering::Relaxed),
            exchanges_total: self.exchanges_total.load(Ordering::Relaxed),
            exchanges_failed: self.exchanges_failed.load(Ordering::Relaxed),
            pings_total: self.pings_total.load(Ordering::Relaxed),
            pings_failed: self.pings_failed.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            timeouts_total: self.timeouts_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub connections_failed: u64,
    pub exchanges_total: u64,
    pub exchanges_failed: u64,
    pub pings_total: u64,
    pub pings_failed: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub remote_errors: u64,
    pub timeouts_total: u64,
}
