//! Sensor samples - Driver output
//!
//! Normalized readings decoded from the gas analyzer and the sonic anemometer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Gas analyzer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasSample {
    /// Local time at which the frame was decoded
    pub timestamp: NaiveDateTime,

    /// Real-time concentration (raw analyzer units, scaled later by the engine)
    pub concentration: f64,

    /// Ambient temperature (°C)
    pub ambient_temperature: f64,

    /// Optical transmittance (%)
    pub transmittance: f64,
}

/// Sonic anemometer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    /// Along-axis wind speed (m/s)
    pub u: f64,

    /// Cross-axis wind speed (m/s)
    pub v: f64,

    /// Vertical wind speed (m/s)
    pub w: f64,

    /// Sonic temperature (°C)
    pub sonic_temperature: f64,
}

/// Sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    Gas,
    Wind,
}

impl SensorChannel {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Wind => "wind",
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded sample from either channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorSample {
    Gas(GasSample),
    Wind(WindSample),
}

impl SensorSample {
    /// Channel the sample belongs to
    pub fn channel(&self) -> SensorChannel {
        match self {
            Self::Gas(_) => SensorChannel::Gas,
            Self::Wind(_) => SensorChannel::Wind,
        }
    }
}

impl From<GasSample> for SensorSample {
    fn from(sample: GasSample) -> Self {
        Self::Gas(sample)
    }
}

impl From<WindSample> for SensorSample {
    fn from(sample: WindSample) -> Self {
        Self::Wind(sample)
    }
}

/// Latest reading seen on each channel
///
/// Owned by the aggregator and only mutated under its lock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestReadings {
    pub gas: Option<GasSample>,
    pub wind: Option<WindSample>,
}

impl LatestReadings {
    /// Store a sample, overwriting the previous value of its channel
    pub fn store(&mut self, sample: SensorSample) {
        match sample {
            SensorSample::Gas(gas) => self.gas = Some(gas),
            SensorSample::Wind(wind) => self.wind = Some(wind),
        }
    }

    /// Whether at least one channel has reported
    pub fn any(&self) -> bool {
        self.gas.is_some() || self.wind.is_some()
    }
}
