//! FluxEngine - turns one sealed raw window into a flux record

use std::path::{Path, PathBuf};

use contracts::{
    ContractError, FluxRecord, FluxReport, SealedWindow, StationBlueprint, WindowAnalyzer,
};
use tracing::{info, instrument, warn};

use crate::constants::FluxConstants;
use crate::error::FluxError;
use crate::lag::cross_covariance_curve;
use crate::output::FluxOutput;
use crate::reader::{read_clean, CleanSeries};
use crate::rotation::double_rotate;
use crate::stats::{covariance, detrend, mean, variance};
use crate::steady::steady_state_test;

/// Eddy-covariance flux engine
///
/// Stateless apart from the output lock, so one instance can serve every
/// concurrent analysis task.
#[derive(Debug)]
pub struct FluxEngine {
    constants: FluxConstants,
    output: FluxOutput,
    supplemental: Option<PathBuf>,
}

impl FluxEngine {
    pub fn new(constants: FluxConstants, output: FluxOutput) -> Self {
        Self {
            constants,
            output,
            supplemental: None,
        }
    }

    /// Build from the `[acquisition]` and `[flux]` sections
    pub fn from_blueprint(blueprint: &StationBlueprint) -> Self {
        let flux = &blueprint.flux;
        let output = FluxOutput::new(&flux.output_dir, &flux.flux_file, &flux.diagnostic_file);
        Self::new(FluxConstants::from(blueprint), output)
            .with_supplemental(flux.supplemental_path.clone())
    }

    /// Record set appended after every window before analysis
    pub fn with_supplemental(mut self, path: Option<PathBuf>) -> Self {
        self.supplemental = path;
        self
    }

    pub fn constants(&self) -> &FluxConstants {
        &self.constants
    }

    pub fn output(&self) -> &FluxOutput {
        &self.output
    }

    /// Read, clean and append the supplemental set
    pub fn load(&self, path: &Path) -> Result<CleanSeries, FluxError> {
        let scale = self.constants.concentration_scale;
        let mut series = read_clean(path, scale)?;
        if let Some(supplemental) = &self.supplemental {
            series.extend(read_clean(supplemental, scale)?);
        }
        if series.is_empty() {
            return Err(FluxError::EmptyWindow {
                path: path.to_path_buf(),
            });
        }
        Ok(series)
    }

    /// Run the computation over a cleaned series
    pub fn compute(&self, series: &CleanSeries) -> Result<FluxReport, FluxError> {
        let constants = &self.constants;
        let required = constants.required_samples();
        if series.len() < required {
            return Err(FluxError::InsufficientSamples {
                found: series.len(),
                required,
            });
        }

        let rotated = double_rotate(&series.u, &series.v, &series.w);
        let u_prime = detrend(&rotated.u2);
        let v_prime = detrend(&rotated.v2);
        let w_prime = detrend(&rotated.w2);
        let c_prime = detrend(&series.concentration);

        for (name, values) in [("w", &w_prime), ("concentration", &c_prime)] {
            let var = variance(values);
            if !(var.is_finite() && var > 0.0) {
                return Err(FluxError::DegenerateSeries { series: name });
            }
        }

        let conversion = constants.flux_unit_conversion;
        let curve = cross_covariance_curve(
            &w_prime,
            &c_prime,
            constants.lag_half_width(),
            conversion,
        );
        let flux_index = curve.abs_argmax();
        let flux = curve.covariances()[flux_index];

        let friction_velocity = (covariance(&u_prime, &w_prime).powi(2)
            + covariance(&v_prime, &w_prime).powi(2))
        .powf(0.25);

        let steady_index = curve.signed_argmax();
        let steady_state_lag = curve.lag_at(steady_index);
        let steady = steady_state_test(
            &w_prime,
            &c_prime,
            steady_state_lag,
            curve.covariances()[steady_index],
            constants.steady_segment_len(),
            conversion,
            (constants.steady_threshold_low, constants.steady_threshold_high),
        );

        let record = FluxRecord {
            timestamp: series.first_timestamp.clone().unwrap_or_default(),
            flux,
            friction_velocity,
            concentration_mean: mean(&series.concentration),
            u2_mean: mean(&rotated.u2),
            v2_mean: mean(&rotated.v2),
            w2_mean: mean(&rotated.w2),
            turbulent_steady_state: steady.class,
        };

        Ok(FluxReport {
            record,
            flux_lag: curve.lag_at(flux_index),
            steady_state_lag,
            previous_flux_mean: steady.previous_flux_mean,
            steady_state_ratio: steady.ratio,
            samples: series.len(),
            curve,
        })
    }

    /// Analyse a raw window file and append the results
    ///
    /// Also used for offline reprocessing of existing window files.
    #[instrument(name = "flux_process_file", skip(self, path), fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> Result<FluxReport, FluxError> {
        let series = self.load(path)?;
        let report = self.compute(&series)?;

        if let Err(e) = self.output.append(&report) {
            warn!(error = %e, "flux output append failed");
            return Err(e);
        }

        metrics::gauge!("ec_flux_flux_value").set(report.record.flux);
        info!(
            timestamp = %report.record.timestamp,
            flux = report.record.flux,
            friction_velocity = report.record.friction_velocity,
            flux_lag = report.flux_lag,
            steady_state_lag = report.steady_state_lag,
            ratio = report.steady_state_ratio,
            class = report.record.turbulent_steady_state.code(),
            samples = report.samples,
            dropped = series.dropped,
            "flux computed"
        );
        Ok(report)
    }
}

impl WindowAnalyzer for FluxEngine {
    fn name(&self) -> &str {
        "flux_engine"
    }

    fn analyze(&self, window: &SealedWindow) -> Result<FluxReport, ContractError> {
        self.process_file(&window.path)
            .map_err(|e| e.into_contract(window.id.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SteadyStateClass, RAW_HEADER};
    use std::fmt::Write as _;
    use std::fs;

    /// Deterministic noise in [-0.5, 0.5)
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        }
    }

    /// Raw window where concentration leads w by `lag` samples
    fn window_text(rows: usize, lag: usize) -> String {
        let mut rng = Lcg(7);
        let w: Vec<f64> = (0..rows + lag).map(|_| rng.next()).collect();
        let mut text = format!("{RAW_HEADER}\n");
        for i in 0..rows {
            let seconds = i / 10;
            let _ = writeln!(
                text,
                "2024-06-01 12:{:02}:{:02}.{}00,{},24.5,88.0,{},{},{},20.1",
                seconds / 60,
                seconds % 60,
                i % 10,
                16.0 * (30.0 + 40.0 * w[i + lag]),
                2.0 + 0.1 * rng.next(),
                0.5 + 0.1 * rng.next(),
                w[i],
            );
        }
        text
    }

    fn engine(dir: &Path) -> FluxEngine {
        FluxEngine::new(
            FluxConstants::default(),
            FluxOutput::new(dir, "EC_FLUX.csv", "cross_covariance_results.txt"),
        )
    }

    #[test]
    fn test_end_to_end_lag_and_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240601_1200.csv");
        fs::write(&path, window_text(3000, 3)).unwrap();

        let engine = engine(dir.path());
        let report = engine.process_file(&path).unwrap();
        assert_eq!(report.flux_lag, 3);
        assert_eq!(report.steady_state_lag, 3);
        assert_eq!(report.record.turbulent_steady_state, SteadyStateClass::Steady);
        assert_eq!(report.record.timestamp, "2024-06-01 12:00:00.000");
        assert_eq!(report.samples, 3000);
        assert!(report.record.flux > 0.0);
        assert!(report.record.v2_mean.abs() < 1e-9);
        assert!(report.record.w2_mean.abs() < 1e-9);
        assert!((report.record.concentration_mean - 30.0).abs() < 1.0);

        let flux = fs::read_to_string(engine.output().flux_path()).unwrap();
        assert_eq!(flux.lines().count(), 2);
        assert!(flux.lines().nth(1).unwrap().ends_with(",0"));
    }

    #[test]
    fn test_insufficient_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, window_text(21, 0)).unwrap();

        let err = engine(dir.path()).process_file(&path).unwrap_err();
        assert!(matches!(
            err,
            FluxError::InsufficientSamples {
                found: 21,
                required: 22
            }
        ));
    }

    #[test]
    fn test_degenerate_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.csv");
        let mut text = format!("{RAW_HEADER}\n");
        for i in 0..100 {
            let _ = writeln!(
                text,
                "2024-06-01 12:00:{:02}.{}00,480,24,88,2.0,0.5,{},20",
                i / 10,
                i % 10,
                if i % 2 == 0 { 0.1 } else { -0.1 }
            );
        }
        fs::write(&path, text).unwrap();

        let err = engine(dir.path()).process_file(&path).unwrap_err();
        assert!(matches!(
            err,
            FluxError::DegenerateSeries {
                series: "concentration"
            }
        ));
        assert!(!dir.path().join("EC_FLUX.csv").exists());
    }

    #[test]
    fn test_empty_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, format!("{RAW_HEADER}\n,,,,,,,\n")).unwrap();

        let err = engine(dir.path()).process_file(&path).unwrap_err();
        assert!(matches!(err, FluxError::EmptyWindow { .. }));
    }

    #[test]
    fn test_supplemental_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.csv");
        let extra = dir.path().join("extra.csv");
        fs::write(&path, window_text(100, 1)).unwrap();
        fs::write(&extra, window_text(50, 1)).unwrap();

        let engine = engine(dir.path()).with_supplemental(Some(extra));
        let series = engine.load(&path).unwrap();
        assert_eq!(series.len(), 150);

        let missing = engine
            .with_supplemental(Some(dir.path().join("missing.csv")))
            .load(&path)
            .unwrap_err();
        assert!(matches!(missing, FluxError::Io { .. }));
    }

    #[test]
    fn test_analyzer_maps_errors() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());
        let window = SealedWindow {
            id: contracts::WindowId::at(
                chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            ),
            path: dir.path().join("20240601_1200.csv"),
            records: 0,
        };
        let err = engine.analyze(&window).unwrap_err();
        assert!(matches!(err, ContractError::Io(_)));
    }
}
