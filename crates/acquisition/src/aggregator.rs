//! Acquisition aggregator implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use contracts::{CombinedRecord, LatestReadings, SensorSample, StopSignal};
use tracing::{debug, instrument, trace};

/// Sampling slot index of `now` for a slot width in milliseconds
pub fn slot_index(now: NaiveDateTime, slot_millis: i64) -> i64 {
    now.and_utc()
        .timestamp_millis()
        .div_euclid(slot_millis.max(1))
}

fn lock(readings: &Mutex<LatestReadings>) -> MutexGuard<'_, LatestReadings> {
    // readings are plain copies, a panicked writer cannot leave them half-updated
    readings.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable writer side of the aggregator, handed to every intake task
#[derive(Debug, Clone)]
pub struct ReadingsHandle {
    readings: Arc<Mutex<LatestReadings>>,
}

impl ReadingsHandle {
    /// Store a sample, overwriting the previous value of its channel
    pub fn update(&self, sample: SensorSample) {
        lock(&self.readings).store(sample);
        trace!(channel = %sample.channel(), "reading updated");
    }

    /// Copy of the latest readings
    pub fn snapshot(&self) -> LatestReadings {
        *lock(&self.readings)
    }
}

/// Acquisition aggregator
///
/// Holds the latest sample of each channel behind one lock and emits at most
/// one `CombinedRecord` per sampling slot.
#[derive(Debug)]
pub struct Aggregator {
    /// Latest readings, shared with every `ReadingsHandle`
    readings: Arc<Mutex<LatestReadings>>,
    /// Slot of the previous emission
    last_slot: Option<i64>,
    /// Slot width (ms)
    slot_millis: i64,
    /// Records emitted so far
    emitted: u64,
}

impl Aggregator {
    /// Create an aggregator for a sampling frequency in Hz
    pub fn new(sampling_hz: u32) -> Self {
        Self {
            readings: Arc::new(Mutex::new(LatestReadings::default())),
            last_slot: None,
            slot_millis: 1000 / i64::from(sampling_hz.max(1)),
            emitted: 0,
        }
    }

    /// Writer handle for an intake task
    pub fn handle(&self) -> ReadingsHandle {
        ReadingsHandle {
            readings: self.readings.clone(),
        }
    }

    /// Slot width (ms)
    pub fn slot_millis(&self) -> i64 {
        self.slot_millis
    }

    /// Records emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Store a sample, overwriting the previous value of its channel
    pub fn update(&self, sample: SensorSample) {
        lock(&self.readings).store(sample);
    }

    /// Copy of the latest readings
    pub fn snapshot(&self) -> LatestReadings {
        *lock(&self.readings)
    }

    /// Emit one record if `now` falls into a new sampling slot
    ///
    /// The lock is held only while both readings are copied. Channels that
    /// have not reported yet are left empty.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<CombinedRecord> {
        let slot = slot_index(now, self.slot_millis);
        if self.last_slot == Some(slot) {
            return None;
        }

        let readings = *lock(&self.readings);
        self.last_slot = Some(slot);
        self.emitted += 1;
        Some(CombinedRecord::merge(now, &readings))
    }

    /// Wait until at least one channel has reported
    ///
    /// Returns `false` if the stop signal fired first.
    #[instrument(name = "aggregator_wait_first_sample", skip_all)]
    pub async fn wait_for_first_sample(&self, stop: &StopSignal, poll: Duration) -> bool {
        let mut interval = tokio::time::interval(poll);
        loop {
            if stop.is_stopped() {
                debug!("stopped before any sensor reported");
                return false;
            }
            if lock(&self.readings).any() {
                debug!("first sample received");
                return true;
            }
            interval.tick().await;
        }
    }
}
