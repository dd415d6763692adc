//! Station orchestrator - wires intake, the tick loop and the flux engine.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use acquisition::Aggregator;
use contracts::{
    ContractError, FluxReport, SealedWindow, StationBlueprint, StopSignal, WindowAnalyzer,
};
use dispatcher::{AcquisitionLoop, DispatcherConfig, RotationDispatcher, SystemClock};
use flux_engine::FluxEngine;
use ingestion::IngestionPipeline;
use observability::FluxMetricsAggregator;
use tracing::{info, warn};

use super::StationStats;
use crate::error::CliError;

/// Poll interval while waiting for the first sensor sample
const FIRST_SAMPLE_POLL: Duration = Duration::from_millis(50);

/// A device read with no data never returns; its intake thread is left detached
const INTAKE_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Station run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub blueprint: StationBlueprint,

    /// Stop after this long (None = until the stop signal)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Flux engine plus run-level bookkeeping
struct RecordingAnalyzer {
    engine: FluxEngine,
    aggregator: Arc<Mutex<FluxMetricsAggregator>>,
}

impl WindowAnalyzer for RecordingAnalyzer {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn analyze(&self, window: &SealedWindow) -> Result<FluxReport, ContractError> {
        let result = self.engine.analyze(window);
        let mut aggregator = self
            .aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match &result {
            Ok(report) => {
                observability::record_flux_report(report);
                aggregator.update(report);
            }
            Err(e) => {
                observability::record_window_failed(failure_reason(e));
                aggregator.record_failure();
            }
        }
        result
    }
}

fn failure_reason(error: &ContractError) -> &'static str {
    match error {
        ContractError::Io(_) => "io",
        ContractError::Analysis { .. } => "analysis",
        _ => "other",
    }
}

/// Main station orchestrator
pub struct Station {
    config: RunConfig,
}

impl Station {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run until `stop` fires, the duration elapses or raw logging fails
    pub async fn run(self, stop: StopSignal) -> Result<StationStats, CliError> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            if let Err(e) = observability::init_metrics_only(port) {
                warn!(error = %e, port, "Metrics endpoint unavailable");
            }
        }

        let flux_aggregator = Arc::new(Mutex::new(FluxMetricsAggregator::new()));
        let analyzer = Arc::new(RecordingAnalyzer {
            engine: FluxEngine::from_blueprint(blueprint),
            aggregator: flux_aggregator.clone(),
        });

        // Intake
        let ingestion = IngestionPipeline::from_sensors(&blueprint.sensors)?;
        let active_sensors = ingestion.sensor_count();
        let aggregator = Aggregator::new(blueprint.acquisition.sampling_hz);
        let intake = ingestion.start(aggregator.handle(), stop.clone());
        let intake_metrics = intake.metrics();
        info!(active_sensors, "Sensor intake started");

        if let Some(duration) = self.config.duration {
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                info!(secs = duration.as_secs(), "Run duration elapsed");
                stop.stop();
            });
        }

        // Acquisition
        let acquisition = if aggregator.wait_for_first_sample(&stop, FIRST_SAMPLE_POLL).await {
            info!(
                raw_dir = %blueprint.rotation.raw_dir.display(),
                period_minutes = blueprint.rotation.period_minutes,
                "First sample received, acquisition starting"
            );
            let dispatcher = RotationDispatcher::new(
                DispatcherConfig::from(&blueprint.rotation),
                analyzer,
            );
            let acquisition_loop = AcquisitionLoop::new(
                aggregator,
                dispatcher,
                Arc::new(SystemClock),
                Duration::from_millis(blueprint.acquisition.tick_interval_ms),
            );
            let result = acquisition_loop.run(stop.clone()).await;
            // a raw log failure must also end intake
            stop.stop();
            Some(result)
        } else {
            info!("Stopped before any sensor reported");
            None
        };

        match tokio::time::timeout(INTAKE_JOIN_TIMEOUT, intake.join()).await {
            Ok(samples) => info!(samples, "Sensor intake stopped"),
            Err(_) => warn!(
                timeout_secs = INTAKE_JOIN_TIMEOUT.as_secs(),
                "Sensor intake still blocked on a read, leaving its thread detached"
            ),
        }

        let acquisition = acquisition.transpose()?;
        let ingestion_snapshot = intake_metrics.snapshot();
        let flux = flux_aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let stats = StationStats {
            duration: start_time.elapsed(),
            active_sensors,
            samples_received: ingestion_snapshot.samples_received,
            decode_errors: ingestion_snapshot.decode_errors,
            transport_errors: ingestion_snapshot.transport_errors,
            acquisition,
            flux,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            records = stats.records_written(),
            "Station shutdown complete"
        );

        Ok(stats)
    }
}
