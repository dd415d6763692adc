//! Engine constants

use contracts::StationBlueprint;

/// Constants of one flux computation
#[derive(Debug, Clone, PartialEq)]
pub struct FluxConstants {
    /// Sampling frequency N (Hz); lags span `-N..=N` samples
    pub sampling_hz: u32,
    /// Raw concentration is divided by this
    pub concentration_scale: f64,
    /// Covariances are multiplied by this
    pub flux_unit_conversion: f64,
    /// Upper ratio bound of the steady class
    pub steady_threshold_low: f64,
    /// Upper ratio bound of the moderate class
    pub steady_threshold_high: f64,
    /// Leading segment used by the steady-state test (minutes)
    pub steady_segment_minutes: u32,
}

impl Default for FluxConstants {
    fn default() -> Self {
        Self {
            sampling_hz: 10,
            concentration_scale: 16.0,
            flux_unit_conversion: 16e-3,
            steady_threshold_low: 0.3,
            steady_threshold_high: 1.0,
            steady_segment_minutes: 5,
        }
    }
}

impl FluxConstants {
    /// Lag half-width in samples
    pub fn lag_half_width(&self) -> usize {
        self.sampling_hz as usize
    }

    /// Minimum cleaned rows: every lag must keep at least two aligned pairs
    pub fn required_samples(&self) -> usize {
        2 * self.lag_half_width() + 2
    }

    /// Samples in the steady-state segment
    pub fn steady_segment_len(&self) -> usize {
        self.steady_segment_minutes as usize * 60 * self.sampling_hz as usize
    }
}

impl From<&StationBlueprint> for FluxConstants {
    fn from(blueprint: &StationBlueprint) -> Self {
        let flux = &blueprint.flux;
        Self {
            sampling_hz: blueprint.acquisition.sampling_hz,
            concentration_scale: flux.concentration_scale,
            flux_unit_conversion: flux.flux_unit_conversion,
            steady_threshold_low: flux.steady_threshold_low,
            steady_threshold_high: flux.steady_threshold_high,
            steady_segment_minutes: flux.steady_segment_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_blueprint_defaults() {
        let from_blueprint = FluxConstants::from(&StationBlueprint::default());
        assert_eq!(from_blueprint, FluxConstants::default());
        assert_eq!(from_blueprint.required_samples(), 22);
        assert_eq!(from_blueprint.steady_segment_len(), 3000);
    }
}
