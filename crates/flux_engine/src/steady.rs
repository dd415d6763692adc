//! Turbulent steady-state test
//!
//! Compares the covariance of a leading segment against the whole-window
//! flux. Both are evaluated at the lag of the largest signed covariance.

use contracts::SteadyStateClass;

use crate::lag::align;
use crate::stats::covariance;

/// Steady-state test result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteadyStateTest {
    pub previous_flux_mean: f64,
    pub ratio: f64,
    pub class: SteadyStateClass,
}

/// Relative deviation; infinite when the reference is zero
pub fn relative_deviation(previous: f64, raw: f64) -> f64 {
    if raw.abs() < 1e-12 {
        return f64::INFINITY;
    }
    (previous - raw).abs() / raw.abs()
}

/// Run the test at `lag` over the first `segment_len` aligned pairs
pub fn steady_state_test(
    w: &[f64],
    c: &[f64],
    lag: i64,
    raw_flux: f64,
    segment_len: usize,
    conversion: f64,
    thresholds: (f64, f64),
) -> SteadyStateTest {
    let (w, c) = align(w, c, lag);
    let end = segment_len.min(w.len());
    let previous_flux_mean = covariance(&w[..end], &c[..end]) * conversion;
    let ratio = relative_deviation(previous_flux_mean, raw_flux);
    SteadyStateTest {
        previous_flux_mean,
        ratio,
        class: SteadyStateClass::classify(ratio, thresholds.0, thresholds.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_reference_is_unsteady() {
        assert!(relative_deviation(1.0, 0.0).is_infinite());
        let w = [1.0, -1.0, 1.0, -1.0];
        let c = [0.0; 4];
        let test = steady_state_test(&w, &c, 0, 0.0, 4, 1.0, (0.3, 1.0));
        assert_eq!(test.class, SteadyStateClass::Unsteady);
    }

    #[test]
    fn test_stationary_series_is_steady() {
        let w: Vec<f64> = (0..400).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let c = w.clone();
        let raw = covariance(&w, &c);
        let test = steady_state_test(&w, &c, 0, raw, 100, 1.0, (0.3, 1.0));
        assert!(test.ratio < 0.05);
        assert_eq!(test.class, SteadyStateClass::Steady);
    }

    #[test]
    fn test_segment_longer_than_series_uses_everything() {
        let w = [1.0, 2.0, 3.0, 4.0, 5.0];
        let c = [2.0, 1.0, 4.0, 3.0, 6.0];
        let raw = covariance(&w, &c);
        let test = steady_state_test(&w, &c, 0, raw, 1000, 1.0, (0.3, 1.0));
        assert_eq!(test.ratio, 0.0);
    }
}
