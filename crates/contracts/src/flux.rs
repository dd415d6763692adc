//! Flux Engine outputs
//!
//! Cross-covariance curve, per-window flux record and the steady-state class.

use serde::{Deserialize, Serialize};

/// Header row of the flux output file
pub const FLUX_HEADER: &str = "TIMESTAMP,flux,friction_velocity,concentration_mean,u2_mean,v2_mean,w2_mean,turbulent_steady_state";

/// Turbulent steady-state classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteadyStateClass {
    /// ratio <= low threshold
    Steady = 0,
    /// low < ratio <= high threshold
    Moderate = 1,
    /// ratio > high threshold, or the ratio is undefined
    Unsteady = 2,
}

impl SteadyStateClass {
    /// Classify a relative deviation against the two thresholds
    pub fn classify(ratio: f64, low: f64, high: f64) -> Self {
        if !ratio.is_finite() {
            Self::Unsteady
        } else if ratio <= low {
            Self::Steady
        } else if ratio <= high {
            Self::Moderate
        } else {
            Self::Unsteady
        }
    }

    /// Numeric code written to the flux file
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Cross-covariance of w' and c' over lags `-N..=N`
///
/// Always holds exactly `2N + 1` points, index `i` maps to lag `i - N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCovarianceCurve {
    half_width: usize,
    covariances: Vec<f64>,
}

impl CrossCovarianceCurve {
    /// Build a curve; returns `None` unless `covariances.len() == 2 * half_width + 1`
    pub fn new(half_width: usize, covariances: Vec<f64>) -> Option<Self> {
        (covariances.len() == 2 * half_width + 1).then_some(Self {
            half_width,
            covariances,
        })
    }

    /// Lag half-width `N` (samples)
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    pub fn len(&self) -> usize {
        self.covariances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covariances.is_empty()
    }

    pub fn covariances(&self) -> &[f64] {
        &self.covariances
    }

    /// Lag in samples for curve index `i`
    pub fn lag_at(&self, index: usize) -> i64 {
        index as i64 - self.half_width as i64
    }

    /// Lag in seconds for curve index `i`
    pub fn lag_seconds_at(&self, index: usize) -> f64 {
        self.lag_at(index) as f64 / self.half_width.max(1) as f64
    }

    /// Covariance at a lag in samples
    pub fn at_lag(&self, lag: i64) -> Option<f64> {
        let index = lag + self.half_width as i64;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.covariances.get(i).copied())
    }

    /// `(lag_seconds, covariance)` pairs in lag order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.covariances
            .iter()
            .enumerate()
            .map(|(i, c)| (self.lag_seconds_at(i), *c))
    }

    /// Index of the largest `|covariance|`; the first one wins on ties
    pub fn abs_argmax(&self) -> usize {
        first_argmax(self.covariances.iter().map(|c| c.abs()))
    }

    /// Index of the largest signed covariance; the first one wins on ties
    pub fn signed_argmax(&self) -> usize {
        first_argmax(self.covariances.iter().copied())
    }

    /// Diagnostic header labels: `"{lag_seconds:.1}s"` per lag
    pub fn lag_labels(&self) -> Vec<String> {
        (0..self.len())
            .map(|i| format!("{:.1}s", self.lag_seconds_at(i)))
            .collect()
    }
}

fn first_argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// One row of the flux output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxRecord {
    /// First timestamp of the window, verbatim
    pub timestamp: String,
    pub flux: f64,
    pub friction_velocity: f64,
    pub concentration_mean: f64,
    pub u2_mean: f64,
    pub v2_mean: f64,
    pub w2_mean: f64,
    pub turbulent_steady_state: SteadyStateClass,
}

impl FluxRecord {
    /// Encode as one flux CSV row (without trailing newline)
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.flux,
            self.friction_velocity,
            self.concentration_mean,
            self.u2_mean,
            self.v2_mean,
            self.w2_mean,
            self.turbulent_steady_state.code()
        )
    }
}

/// Full analysis result for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxReport {
    pub record: FluxRecord,
    pub curve: CrossCovarianceCurve,
    /// Lag (samples) maximising |covariance|, used for the flux
    pub flux_lag: i64,
    /// Lag (samples) maximising the signed covariance, used for the steady-state test
    pub steady_state_lag: i64,
    /// Covariance over the leading segment at `steady_state_lag`
    pub previous_flux_mean: f64,
    /// Relative deviation used for classification
    pub steady_state_ratio: f64,
    /// Samples left after cleaning
    pub samples: usize,
}
