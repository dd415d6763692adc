//! Intake configuration and metrics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Intake loop configuration
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Sleep when a driver has no complete frame yet
    pub idle_backoff: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            idle_backoff: Duration::from_millis(5),
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Samples handed to the aggregator
    pub samples_received: AtomicU64,

    /// Frames that failed to decode
    pub decode_errors: AtomicU64,

    /// Transport failures (each ends one intake task)
    pub transport_errors: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record sample received
    pub fn record_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record decode error
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record transport error
    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Samples handed to the aggregator
    pub samples_received: u64,

    /// Frames that failed to decode
    pub decode_errors: u64,

    /// Transport failures
    pub transport_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = IngestionMetrics::new();
        metrics.record_received();
        metrics.record_received();
        metrics.record_decode_error();
        let snap = metrics.snapshot();
        assert_eq!(snap.samples_received, 2);
        assert_eq!(snap.decode_errors, 1);
        assert_eq!(snap.transport_errors, 0);
    }
}
