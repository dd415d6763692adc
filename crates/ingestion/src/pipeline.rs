//! Ingestion Pipeline main entry

use std::sync::Arc;

use acquisition::ReadingsHandle;
use contracts::{SensorChannel, SensorDriver, SensorsConfig, StopSignal};
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{IngestionMetrics, IntakeConfig};
use crate::error::Result;
use crate::transport::open_driver;

/// Ingestion Pipeline
///
/// Owns one driver per sensor. Once started, every driver runs on its own
/// detached thread and feeds the aggregator through a `ReadingsHandle`.
/// A read that never returns keeps only its own thread alive, never the
/// runtime.
pub struct IngestionPipeline {
    /// Registered drivers
    drivers: Vec<Box<dyn SensorDriver>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Intake loop configuration
    config: IntakeConfig,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    pub fn new() -> Self {
        Self::with_config(IntakeConfig::default())
    }

    /// Create with custom intake configuration
    pub fn with_config(config: IntakeConfig) -> Self {
        Self {
            drivers: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            config,
        }
    }

    /// Open and register the gas and wind drivers of a station
    pub fn from_sensors(sensors: &SensorsConfig) -> Result<Self> {
        let mut pipeline = Self::new();
        pipeline.register_driver(open_driver(SensorChannel::Gas, &sensors.gas)?);
        pipeline.register_driver(open_driver(SensorChannel::Wind, &sensors.wind)?);
        Ok(pipeline)
    }

    /// Register a sensor driver
    #[instrument(
        name = "ingestion_register_driver",
        skip(self, driver),
        fields(sensor = %driver.name(), channel = %driver.channel())
    )]
    pub fn register_driver(&mut self, driver: Box<dyn SensorDriver>) {
        debug!("registered sensor driver");
        self.drivers.push(driver);
    }

    /// Start one intake thread per driver
    #[instrument(name = "ingestion_start", skip_all, fields(count = self.drivers.len()))]
    pub fn start(self, readings: ReadingsHandle, stop: StopSignal) -> IntakeHandle {
        info!("starting sensor intake");
        let mut tasks = Vec::with_capacity(self.drivers.len());

        for driver in self.drivers {
            let name = driver.name().to_string();
            let readings = readings.clone();
            let stop = stop.clone();
            let metrics = self.metrics.clone();
            let config = self.config.clone();
            let (done_tx, done_rx) = oneshot::channel();

            let spawned = std::thread::Builder::new()
                .name(format!("intake-{name}"))
                .spawn(move || {
                    let delivered = run_intake(driver, readings, stop, metrics, config);
                    // the handle may already have been dropped
                    let _ = done_tx.send(delivered);
                });
            match spawned {
                Ok(_) => tasks.push((name, done_rx)),
                Err(e) => {
                    self.metrics.record_transport_error();
                    error!(sensor = %name, error = %e, "failed to spawn intake thread");
                }
            }
        }

        IntakeHandle {
            tasks,
            metrics: self.metrics,
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered sensor count
    pub fn sensor_count(&self) -> usize {
        self.drivers.len()
    }
}

/// Handle over the running intake threads
pub struct IntakeHandle {
    tasks: Vec<(String, oneshot::Receiver<u64>)>,
    metrics: Arc<IngestionMetrics>,
}

impl IntakeHandle {
    /// Number of intake threads
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Shared metrics
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Wait for every intake thread; returns the total number of samples delivered
    ///
    /// Threads only exit once the stop signal fired or their transport failed.
    /// Dropping the returned future (e.g. on a timeout) leaves a blocked
    /// thread detached.
    pub async fn join(self) -> u64 {
        let mut total = 0;
        for (sensor, done) in self.tasks {
            match done.await {
                Ok(samples) => total += samples,
                Err(_) => error!(sensor = %sensor, "intake thread panicked"),
            }
        }
        total
    }
}

/// Blocking intake loop of one driver
fn run_intake(
    mut driver: Box<dyn SensorDriver>,
    readings: ReadingsHandle,
    stop: StopSignal,
    metrics: Arc<IngestionMetrics>,
    config: IntakeConfig,
) -> u64 {
    let sensor = driver.name().to_string();
    let channel = driver.channel();
    let mut delivered = 0u64;
    debug!(sensor = %sensor, %channel, "intake started");

    while !stop.is_stopped() {
        match driver.poll() {
            Ok(Some(sample)) => {
                readings.update(sample);
                metrics.record_received();
                delivered += 1;
            }
            Ok(None) => std::thread::sleep(config.idle_backoff),
            Err(e) if e.is_frame_local() => {
                metrics.record_decode_error();
                metrics::counter!(
                    "ec_flux_decode_errors_total",
                    "channel" => channel.as_str()
                )
                .increment(1);
                warn!(sensor = %sensor, error = %e, "frame dropped");
            }
            Err(e) => {
                metrics.record_transport_error();
                error!(sensor = %sensor, error = %e, "transport failed, intake stopped");
                break;
            }
        }
    }

    debug!(sensor = %sensor, delivered, "intake finished");
    delivered
}
