//! Window rotation rule and state

use chrono::{NaiveDateTime, Timelike};
use contracts::WindowId;

/// Whether `now` sits on a rotation boundary
///
/// True when the minute of day is a multiple of `period_minutes` and the
/// window named after `now` is not the one currently open. The second
/// condition keeps the rule from firing again on later ticks of the same
/// boundary minute.
pub fn should_rotate(now: NaiveDateTime, period_minutes: u32, current_file: Option<&str>) -> bool {
    let Some(current_file) = current_file else {
        return false;
    };
    let minute_of_day = now.hour() * 60 + now.minute();
    minute_of_day % period_minutes.max(1) == 0 && WindowId::at(now).file_name() != current_file
}

/// Identity of the open window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWindow {
    pub id: WindowId,
    pub file_name: String,
    pub opened_at: NaiveDateTime,
}

/// Rotation bookkeeping owned by the dispatcher
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    current: Option<OpenWindow>,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&OpenWindow> {
        self.current.as_ref()
    }

    /// File name of the open window
    pub fn current_file(&self) -> Option<&str> {
        self.current.as_ref().map(|w| w.file_name.as_str())
    }

    /// Record a newly opened window
    pub fn open(&mut self, opened_at: NaiveDateTime) -> WindowId {
        let id = WindowId::at(opened_at);
        self.current = Some(OpenWindow {
            id,
            file_name: id.file_name(),
            opened_at,
        });
        id
    }

    /// Forget the open window
    pub fn close(&mut self) -> Option<OpenWindow> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_rotation_rule() {
        let mut state = RotationState::new();
        assert!(!should_rotate(at(12, 30, 0), 30, state.current_file()));

        state.open(at(12, 17, 42));
        assert_eq!(state.current_file(), Some("20240601_1217.csv"));

        assert!(!should_rotate(at(12, 29, 59), 30, state.current_file()));
        assert!(should_rotate(at(12, 30, 0), 30, state.current_file()));

        state.open(at(12, 30, 0));
        // later ticks of the boundary minute do not fire again
        assert!(!should_rotate(at(12, 30, 0), 30, state.current_file()));
        assert!(!should_rotate(at(12, 30, 59), 30, state.current_file()));
        assert!(!should_rotate(at(12, 31, 0), 30, state.current_file()));
        assert!(should_rotate(at(13, 0, 0), 30, state.current_file()));
    }

    #[test]
    fn test_midnight_boundary() {
        let mut state = RotationState::new();
        state.open(at(23, 45, 10));
        let midnight = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(should_rotate(midnight, 30, state.current_file()));
        assert!(!should_rotate(at(23, 50, 0), 30, state.current_file()));
    }

    #[test]
    fn test_first_window_not_aligned() {
        let mut state = RotationState::new();
        let id = state.open(at(9, 7, 3));
        assert_eq!(id.name(), "20240601_0907");
        assert_eq!(state.close().map(|w| w.opened_at), Some(at(9, 7, 3)));
        assert!(state.current().is_none());
    }
}
