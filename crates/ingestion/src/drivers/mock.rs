//! Mock sensor driver
//!
//! Produces synthetic samples for runs without hardware. Both channels are
//! derived from the wall clock, so two independent mock drivers stay
//! correlated: the gas concentration follows the vertical wind with a fixed lag.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, Timelike};
use contracts::{ContractError, GasSample, SensorChannel, SensorDriver, SensorSample, WindSample};
use tracing::debug;

/// Synthetic turbulence shared by the mock channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSignal {
    /// Gas lags the vertical wind by this many seconds
    pub lag_seconds: f64,

    /// Analyzer raw units per concentration unit
    pub concentration_scale: f64,
}

impl Default for SyntheticSignal {
    fn default() -> Self {
        Self {
            lag_seconds: 0.3,
            concentration_scale: 16.0,
        }
    }
}

impl SyntheticSignal {
    /// Vertical wind at `t` seconds of day
    pub fn w(&self, t: f64) -> f64 {
        0.25 * (TAU * t / 6.1).sin()
            + 0.12 * (TAU * t / 2.3 + 1.0).sin()
            + 0.05 * (TAU * t / 0.9 + 0.4).sin()
    }

    /// Wind sample at `t` seconds of day
    pub fn wind_at(&self, t: f64) -> WindSample {
        WindSample {
            u: 2.0 + 0.4 * (TAU * t / 17.0).sin(),
            v: 0.6 + 0.3 * (TAU * t / 11.0 + 0.5).sin(),
            w: self.w(t),
            sonic_temperature: 22.0 + 0.2 * (TAU * t / 31.0).sin(),
        }
    }

    /// Gas sample at `timestamp`, following `w` delayed by the lag
    pub fn gas_at(&self, timestamp: NaiveDateTime) -> GasSample {
        let t = seconds_of_day(timestamp);
        GasSample {
            timestamp,
            concentration: self.concentration_scale * (30.0 + 40.0 * self.w(t - self.lag_seconds)),
            ambient_temperature: 24.5,
            transmittance: 88.0,
        }
    }
}

fn seconds_of_day(timestamp: NaiveDateTime) -> f64 {
    f64::from(timestamp.num_seconds_from_midnight())
        + f64::from(timestamp.nanosecond()) / 1_000_000_000.0
}

/// Mock driver pacing itself at a fixed frequency
pub struct MockDriver {
    name: String,
    channel: SensorChannel,
    period: Duration,
    next_due: Instant,
    signal: SyntheticSignal,
}

impl MockDriver {
    pub fn new(name: impl Into<String>, channel: SensorChannel, frequency_hz: f64) -> Self {
        let name = name.into();
        let period = Duration::from_secs_f64(1.0 / frequency_hz.max(f64::MIN_POSITIVE));
        debug!(sensor = %name, %channel, frequency_hz, "mock driver created");
        Self {
            name,
            channel,
            period,
            next_due: Instant::now(),
            signal: SyntheticSignal::default(),
        }
    }

    /// Replace the synthetic signal
    pub fn with_signal(mut self, signal: SyntheticSignal) -> Self {
        self.signal = signal;
        self
    }

    fn wait_until_due(&mut self) {
        let now = Instant::now();
        if now < self.next_due {
            std::thread::sleep(self.next_due - now);
        }
        self.next_due += self.period;
        // skip missed periods instead of bursting
        let now = Instant::now();
        if self.next_due < now {
            self.next_due = now + self.period;
        }
    }
}

impl SensorDriver for MockDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> SensorChannel {
        self.channel
    }

    fn poll(&mut self) -> Result<Option<SensorSample>, ContractError> {
        self.wait_until_due();
        let timestamp = Local::now().naive_local();
        let sample = match self.channel {
            SensorChannel::Gas => self.signal.gas_at(timestamp).into(),
            SensorChannel::Wind => self.signal.wind_at(seconds_of_day(timestamp)).into(),
        };
        Ok(Some(sample))
    }
}
