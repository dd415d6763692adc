//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the writer loop and the analysis tasks
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Rows appended to raw logs
    records_written: AtomicU64,
    /// Window files opened
    windows_opened: AtomicU64,
    /// Sealed windows handed to the analyzer
    windows_dispatched: AtomicU64,
    /// Analyses that produced a report
    windows_analyzed: AtomicU64,
    /// Analyses that returned an error or panicked
    windows_failed: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn inc_records_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("ec_flux_records_written_total").increment(1);
    }

    pub fn windows_opened(&self) -> u64 {
        self.windows_opened.load(Ordering::Relaxed)
    }

    pub fn inc_windows_opened(&self) {
        self.windows_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn windows_dispatched(&self) -> u64 {
        self.windows_dispatched.load(Ordering::Relaxed)
    }

    pub fn inc_windows_dispatched(&self) {
        self.windows_dispatched.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("ec_flux_windows_dispatched_total").increment(1);
    }

    pub fn windows_analyzed(&self) -> u64 {
        self.windows_analyzed.load(Ordering::Relaxed)
    }

    pub fn inc_windows_analyzed(&self) {
        self.windows_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn windows_failed(&self) -> u64 {
        self.windows_failed.load(Ordering::Relaxed)
    }

    pub fn inc_windows_failed(&self) {
        self.windows_failed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("ec_flux_windows_failed_total").increment(1);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_written: self.records_written(),
            windows_opened: self.windows_opened(),
            windows_dispatched: self.windows_dispatched(),
            windows_analyzed: self.windows_analyzed(),
            windows_failed: self.windows_failed(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_written: u64,
    pub windows_opened: u64,
    pub windows_dispatched: u64,
    pub windows_analyzed: u64,
    pub windows_failed: u64,
}
