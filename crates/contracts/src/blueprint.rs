//! StationBlueprint - Config Loader output
//!
//! Describes the whole station: acquisition cadence, window rotation,
//! flux engine constants and the transport of each sensor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete station configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Station identity
    #[serde(default)]
    pub station: StationConfig,

    /// Sampling cadence
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Raw window rotation
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Flux engine constants and outputs
    #[serde(default)]
    pub flux: FluxConfig,

    /// Sensor transports
    #[serde(default)]
    pub sensors: SensorsConfig,
}

/// Station identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station name (log field only)
    #[serde(default = "default_station_name")]
    pub name: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
        }
    }
}

fn default_station_name() -> String {
    "openflux".to_string()
}

/// Acquisition cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Sampling frequency N (Hz); also the lag half-width in samples (±1 s)
    #[serde(default = "default_sampling_hz")]
    pub sampling_hz: u32,

    /// Tick loop polling interval (ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sampling_hz: default_sampling_hz(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl AcquisitionConfig {
    /// Width of one sampling slot in milliseconds
    pub fn slot_millis(&self) -> i64 {
        1000 / i64::from(self.sampling_hz.max(1))
    }

    /// Lag half-width in samples
    pub fn lag_half_width(&self) -> usize {
        self.sampling_hz as usize
    }
}

fn default_sampling_hz() -> u32 {
    10
}

fn default_tick_interval_ms() -> u64 {
    10
}

/// Raw window rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Rotation period (minutes); boundaries are minute-of-day multiples
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,

    /// Directory receiving raw window files
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            period_minutes: default_period_minutes(),
            raw_dir: default_raw_dir(),
        }
    }
}

fn default_period_minutes() -> u32 {
    30
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("./OpenFlux_data")
}

/// Flux engine constants and outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxConfig {
    /// Output directory for the flux and diagnostic files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Flux CSV file name
    #[serde(default = "default_flux_file")]
    pub flux_file: String,

    /// Cross-covariance diagnostic file name
    #[serde(default = "default_diagnostic_file")]
    pub diagnostic_file: String,

    /// Raw concentration is divided by this
    #[serde(default = "default_concentration_scale")]
    pub concentration_scale: f64,

    /// Covariances are multiplied by this
    #[serde(default = "default_flux_unit_conversion")]
    pub flux_unit_conversion: f64,

    /// Upper bound of the steady class
    #[serde(default = "default_steady_threshold_low")]
    pub steady_threshold_low: f64,

    /// Upper bound of the moderate class
    #[serde(default = "default_steady_threshold_high")]
    pub steady_threshold_high: f64,

    /// Leading segment compared against the whole window (minutes)
    #[serde(default = "default_steady_segment_minutes")]
    pub steady_segment_minutes: u32,

    /// Record set appended after every window before analysis
    #[serde(default)]
    pub supplemental_path: Option<PathBuf>,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            flux_file: default_flux_file(),
            diagnostic_file: default_diagnostic_file(),
            concentration_scale: default_concentration_scale(),
            flux_unit_conversion: default_flux_unit_conversion(),
            steady_threshold_low: default_steady_threshold_low(),
            steady_threshold_high: default_steady_threshold_high(),
            steady_segment_minutes: default_steady_segment_minutes(),
            supplemental_path: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./EC_FLUX")
}

fn default_flux_file() -> String {
    "EC_FLUX.csv".to_string()
}

fn default_diagnostic_file() -> String {
    "cross_covariance_results.txt".to_string()
}

fn default_concentration_scale() -> f64 {
    16.0
}

fn default_flux_unit_conversion() -> f64 {
    16e-3
}

fn default_steady_threshold_low() -> f64 {
    0.3
}

fn default_steady_threshold_high() -> f64 {
    1.0
}

fn default_steady_segment_minutes() -> u32 {
    5
}

/// Sensor transports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsConfig {
    /// Trace-gas analyzer
    #[serde(default = "default_gas_sensor")]
    pub gas: SensorConfig,

    /// Sonic anemometer
    #[serde(default = "default_wind_sensor")]
    pub wind: SensorConfig,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            gas: default_gas_sensor(),
            wind: default_wind_sensor(),
        }
    }
}

fn default_gas_sensor() -> SensorConfig {
    SensorConfig {
        id: "ht8x00".to_string(),
        transport: TransportConfig::Mock {
            frequency_hz: default_mock_frequency(),
        },
    }
}

fn default_wind_sensor() -> SensorConfig {
    SensorConfig {
        id: "sonic".to_string(),
        transport: TransportConfig::Mock {
            frequency_hz: default_mock_frequency(),
        },
    }
}

/// One sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sensor identifier (log field)
    pub id: String,

    /// Byte source feeding the decoder
    pub transport: TransportConfig,
}

/// Byte source of a sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Character device or file (serial TTY configured out of band, or a capture file)
    Device { path: PathBuf },

    /// Serial-to-ethernet bridge
    Tcp {
        address: String,
        #[serde(default = "default_read_timeout_ms")]
        read_timeout_ms: u64,
    },

    /// Synthetic frames, no hardware
    Mock {
        #[serde(default = "default_mock_frequency")]
        frequency_hz: f64,
    },
}

fn default_read_timeout_ms() -> u64 {
    200
}

fn default_mock_frequency() -> f64 {
    20.0
}
