//! # Integration Tests
//!
//! Cross-crate integration and end-to-end tests.
//!
//! Covers:
//! - configuration defaults and validation
//! - raw window file round-trip
//! - rotation under concurrent sensor updates (simulated clock)
//! - acquisition through flux computation

#[cfg(test)]
mod contract_tests {
    use chrono::NaiveDate;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{CombinedRecord, GasSample, LatestReadings, WindSample, RAW_HEADER};
    use dispatcher::WindowWriter;

    #[test]
    fn test_defaults_load_from_empty_toml() {
        let blueprint = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.acquisition.sampling_hz, 10);
        assert_eq!(blueprint.acquisition.tick_interval_ms, 10);
        assert_eq!(blueprint.rotation.period_minutes, 30);
        assert_eq!(blueprint.flux.concentration_scale, 16.0);
        assert_eq!(blueprint.flux.flux_unit_conversion, 16e-3);
        assert_eq!(blueprint.flux.steady_threshold_low, 0.3);
        assert_eq!(blueprint.flux.steady_threshold_high, 1.0);
        assert_eq!(blueprint.flux.steady_segment_minutes, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "[acquisition]\nsampling_hz = 0\n",
            "[acquisition]\nsampling_hz = 7\n",
            "[rotation]\nperiod_minutes = 45\n",
            "[flux]\nconcentration_scale = 0.0\n",
            "[flux]\nsteady_threshold_low = 2.0\nsteady_threshold_high = 1.0\n",
        ] {
            assert!(
                ConfigLoader::load_from_str(content, ConfigFormat::Toml).is_err(),
                "accepted: {content}"
            );
        }
    }

    #[test]
    fn test_raw_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 100)
            .unwrap();
        let readings = LatestReadings {
            gas: Some(GasSample {
                timestamp: at,
                concentration: 497.25,
                ambient_temperature: 24.5,
                transmittance: 88.0,
            }),
            wind: Some(WindSample {
                u: 1.52,
                v: -0.31,
                w: 0.07,
                sonic_temperature: 23.91,
            }),
        };
        let record = CombinedRecord::merge(at, &readings);

        let mut writer = WindowWriter::open(dir.path(), contracts::WindowId::at(at)).unwrap();
        writer.append(&record).unwrap();
        let sealed = writer.seal().unwrap();

        let text = std::fs::read_to_string(&sealed.path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(RAW_HEADER));
        let parsed = CombinedRecord::parse_csv_row(lines.next().unwrap()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(lines.next(), None);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use acquisition::Aggregator;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use contracts::{
        ContractError, FluxReport, GasSample, SealedWindow, SensorSample, StationBlueprint,
        WindSample, WindowAnalyzer, FLUX_HEADER,
    };
    use dispatcher::{Clock, DispatcherConfig, ManualClock, RotationDispatcher};
    use flux_engine::FluxEngine;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    /// Counts calls and records window names
    #[derive(Default)]
    struct CountingAnalyzer {
        calls: AtomicUsize,
        windows: std::sync::Mutex<Vec<String>>,
    }

    impl WindowAnalyzer for CountingAnalyzer {
        fn name(&self) -> &str {
            "counting"
        }

        fn analyze(&self, window: &SealedWindow) -> Result<FluxReport, ContractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.windows.lock().unwrap().push(window.id.name());
            Err(ContractError::analysis(window.id.name(), "not computed"))
        }
    }

    fn wind(w: f64) -> SensorSample {
        SensorSample::Wind(WindSample {
            u: 2.0,
            v: 0.5,
            w,
            sonic_temperature: 21.0,
        })
    }

    fn gas(timestamp: NaiveDateTime, concentration: f64) -> SensorSample {
        SensorSample::Gas(GasSample {
            timestamp,
            concentration,
            ambient_temperature: 24.5,
            transmittance: 88.0,
        })
    }

    fn csv_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Simulated clock crossing a 30-minute boundary while two threads hammer `update`
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_boundary_crossing_under_concurrent_updates() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Arc::new(CountingAnalyzer::default());
        let mut dispatcher = RotationDispatcher::new(
            DispatcherConfig {
                raw_dir: dir.path().to_path_buf(),
                period_minutes: 30,
            },
            analyzer.clone(),
        );
        let mut aggregator = Aggregator::new(10);
        let clock = ManualClock::stepping(at(12, 29, 50), Duration::milliseconds(100));

        let done = Arc::new(AtomicBool::new(false));
        let writers: Vec<_> = (0..2)
            .map(|i| {
                let handle = aggregator.handle();
                let done = done.clone();
                std::thread::spawn(move || {
                    let mut n = 0u64;
                    while !done.load(Ordering::Relaxed) {
                        if i == 0 {
                            handle.update(wind(n as f64 * 1e-3));
                        } else {
                            handle.update(gas(at(12, 29, 50), 480.0 + n as f64));
                        }
                        n += 1;
                    }
                })
            })
            .collect();

        // 20 s of simulated ticks, boundary at 12:30:00
        for _ in 0..200 {
            let now = clock.now();
            dispatcher.check_rotation(now).unwrap();
            if let Some(record) = aggregator.tick(now) {
                dispatcher.write(&record).unwrap();
            }
        }

        done.store(true, Ordering::Relaxed);
        for writer in writers {
            writer.join().unwrap();
        }
        let metrics = dispatcher.metrics().clone();
        let last = dispatcher.shutdown().await.unwrap().unwrap();

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*analyzer.windows.lock().unwrap(), vec!["20240601_1229"]);
        assert_eq!(metrics.windows_dispatched(), 1);
        assert_eq!(metrics.windows_opened(), 2);
        assert_eq!(metrics.records_written(), 200);
        assert_eq!(last.id.name(), "20240601_1230");
        assert_eq!(
            csv_files(dir.path()),
            vec!["20240601_1229.csv", "20240601_1230.csv"]
        );

        // 100 rows before the boundary, 100 after; one header each
        let first = fs::read_to_string(dir.path().join("20240601_1229.csv")).unwrap();
        assert_eq!(first.lines().count(), 101);
        let second = fs::read_to_string(dir.path().join("20240601_1230.csv")).unwrap();
        assert_eq!(second.lines().count(), 101);
    }

    /// Deterministic noise in [-0.5, 0.5)
    fn noise(n: usize) -> Vec<f64> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    /// Five minutes of 10 Hz data with `c[i] = w[i + 3]`, then the boundary
    #[tokio::test]
    async fn test_acquisition_to_flux() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = StationBlueprint::default();
        blueprint.rotation.raw_dir = dir.path().join("raw");
        blueprint.flux.output_dir = dir.path().join("flux");

        let engine = Arc::new(FluxEngine::from_blueprint(&blueprint));
        let mut dispatcher =
            RotationDispatcher::new(DispatcherConfig::from(&blueprint.rotation), engine.clone());
        let mut aggregator = Aggregator::new(blueprint.acquisition.sampling_hz);
        let clock = ManualClock::stepping(at(12, 25, 0), Duration::milliseconds(100));

        let rows = 3000;
        let lag = 3;
        let w = noise(rows + lag + 1);
        for i in 0..=rows {
            let now = clock.now();
            aggregator.update(wind(w[i]));
            aggregator.update(gas(now, 16.0 * (30.0 + 40.0 * w[i + lag])));
            dispatcher.check_rotation(now).unwrap();
            if let Some(record) = aggregator.tick(now) {
                dispatcher.write(&record).unwrap();
            }
        }
        let metrics = dispatcher.metrics().clone();
        dispatcher.shutdown().await.unwrap();

        assert_eq!(metrics.windows_dispatched(), 1);
        assert_eq!(metrics.windows_analyzed(), 1);

        let flux = fs::read_to_string(engine.output().flux_path()).unwrap();
        let lines: Vec<&str> = flux.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], FLUX_HEADER);
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[0], "2024-06-01 12:25:00.000");
        assert!(fields[1].parse::<f64>().unwrap() > 0.0);
        assert_eq!(fields[7], "0");

        // selected lag from the diagnostic curve
        let diagnostic = fs::read_to_string(engine.output().diagnostic_path()).unwrap();
        let lines: Vec<&str> = diagnostic.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("time\t-1.0s\t-0.9s"));
        let curve: Vec<f64> = lines[1]
            .split('\t')
            .skip(1)
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(curve.len(), 21);
        let best = curve
            .iter()
            .enumerate()
            .fold(0, |best, (i, c)| if c.abs() > curve[best].abs() { i } else { best });
        assert_eq!(best as i64 - 10, 3);
    }

    /// Mock drivers feed the real intake pipeline into the aggregator
    #[tokio::test]
    async fn test_mock_intake_reaches_aggregator() {
        let blueprint = StationBlueprint::default();
        let pipeline = ingestion::IngestionPipeline::from_sensors(&blueprint.sensors).unwrap();
        assert_eq!(pipeline.sensor_count(), 2);

        let aggregator = Aggregator::new(blueprint.acquisition.sampling_hz);
        let stop = contracts::StopSignal::new();
        let intake = pipeline.start(aggregator.handle(), stop.clone());

        let ready = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            aggregator.wait_for_first_sample(&stop, std::time::Duration::from_millis(10)),
        )
        .await
        .unwrap();
        assert!(ready);

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        stop.stop();
        let delivered = intake.join().await;
        assert!(delivered > 0);

        let snapshot = aggregator.snapshot();
        assert!(snapshot.gas.is_some());
        assert!(snapshot.wind.is_some());
    }
}
