//! Flux station metrics
//!
//! Prometheus recording helpers plus an in-memory aggregator for run summaries.

use std::collections::HashMap;

use contracts::{FluxReport, SteadyStateClass};
use metrics::{counter, gauge, histogram};

/// Record one successfully analysed window
pub fn record_flux_report(report: &FluxReport) {
    let record = &report.record;
    counter!("ec_flux_windows_analyzed_total").increment(1);
    counter!(
        "ec_flux_steady_state_total",
        "class" => record.turbulent_steady_state.code().to_string()
    )
    .increment(1);

    gauge!("ec_flux_friction_velocity").set(record.friction_velocity);
    gauge!("ec_flux_concentration_mean").set(record.concentration_mean);
    gauge!("ec_flux_lag_samples").set(report.flux_lag as f64);

    histogram!("ec_flux_window_samples").record(report.samples as f64);
    if report.steady_state_ratio.is_finite() {
        histogram!("ec_flux_steady_state_ratio").record(report.steady_state_ratio);
    }
}

/// Record a window that produced no flux row
pub fn record_window_failed(reason: &str) {
    counter!(
        "ec_flux_windows_skipped_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// In-memory aggregation of analysed windows
#[derive(Debug, Clone, Default)]
pub struct FluxMetricsAggregator {
    pub total_windows: u64,
    pub failed_windows: u64,
    /// Windows per steady-state code
    pub class_counts: HashMap<u8, u64>,
    pub flux_stats: RunningStats,
    pub friction_velocity_stats: RunningStats,
    pub lag_stats: RunningStats,
    /// Samples per window
    pub sample_stats: RunningStats,
}

impl FluxMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one report
    pub fn update(&mut self, report: &FluxReport) {
        self.total_windows += 1;
        *self
            .class_counts
            .entry(report.record.turbulent_steady_state.code())
            .or_insert(0) += 1;
        self.flux_stats.push(report.record.flux);
        self.friction_velocity_stats
            .push(report.record.friction_velocity);
        self.lag_stats.push(report.flux_lag as f64);
        self.sample_stats.push(report.samples as f64);
    }

    pub fn record_failure(&mut self) {
        self.failed_windows += 1;
    }

    pub fn summary(&self) -> MetricsSummary {
        let class = |c: SteadyStateClass| self.class_counts.get(&c.code()).copied().unwrap_or(0);
        let attempted = self.total_windows + self.failed_windows;
        MetricsSummary {
            total_windows: self.total_windows,
            failed_windows: self.failed_windows,
            failure_rate: if attempted > 0 {
                self.failed_windows as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            steady: class(SteadyStateClass::Steady),
            moderate: class(SteadyStateClass::Moderate),
            unsteady: class(SteadyStateClass::Unsteady),
            flux: StatsSummary::from(&self.flux_stats),
            friction_velocity: StatsSummary::from(&self.friction_velocity_stats),
            lag_samples: StatsSummary::from(&self.lag_stats),
            samples: StatsSummary::from(&self.sample_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Run summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_windows: u64,
    pub failed_windows: u64,
    pub failure_rate: f64,
    pub steady: u64,
    pub moderate: u64,
    pub unsteady: u64,
    pub flux: StatsSummary,
    pub friction_velocity: StatsSummary,
    pub lag_samples: StatsSummary,
    pub samples: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flux Summary ===")?;
        writeln!(f, "Windows analysed: {}", self.total_windows)?;
        writeln!(
            f,
            "Windows skipped: {} ({:.2}%)",
            self.failed_windows, self.failure_rate
        )?;
        writeln!(
            f,
            "Steady state: steady={}, moderate={}, unsteady={}",
            self.steady, self.moderate, self.unsteady
        )?;
        writeln!(f, "Flux: {}", self.flux)?;
        writeln!(f, "Friction velocity: {}", self.friction_velocity)?;
        writeln!(f, "Lag (samples): {}", self.lag_samples)?;
        writeln!(f, "Samples per window: {}", self.samples)?;
        Ok(())
    }
}

/// Summary of a `RunningStats`
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.4}, max={:.4}, mean={:.4}, std={:.4} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
