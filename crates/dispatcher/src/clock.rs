//! Wall-clock abstraction
//!
//! Rotation and record timestamps are both read from a `Clock`, so tests can
//! drive the loop across window boundaries without waiting.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Local, NaiveDateTime};

/// Source of local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug)]
struct ManualState {
    now: NaiveDateTime,
    step: Duration,
}

/// Simulated clock
///
/// Returns the time it was set to; with a non-zero step every `now()` call
/// advances it afterwards, which lets a loop walk through simulated time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Clock frozen at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self::stepping(start, Duration::zero())
    }

    /// Clock advancing by `step` after every reading
    pub fn stepping(start: NaiveDateTime, step: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState { now: start, step })),
        }
    }

    /// Set the current time
    pub fn set(&self, now: NaiveDateTime) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now = now;
    }

    /// Move the current time forward
    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now += by;
    }

    /// Current time without stepping
    pub fn peek(&self) -> NaiveDateTime {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = state.now;
        let step = state.step;
        state.now += step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_manual_clock_steps() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let clock = ManualClock::stepping(start, Duration::milliseconds(100));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::milliseconds(100));
        assert_eq!(clock.peek(), start + Duration::milliseconds(200));

        clock.set(start);
        clock.advance(Duration::minutes(30));
        assert_eq!(clock.peek(), start + Duration::minutes(30));
    }
}
