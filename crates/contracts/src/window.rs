//! Window identity - Dispatcher output
//!
//! A raw window is named by the minute it was opened at.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Format of window names (`YYYYMMDD_HHMM`)
pub const WINDOW_NAME_FORMAT: &str = "%Y%m%d_%H%M";

/// Extension of raw window files
pub const RAW_FILE_EXTENSION: &str = "csv";

/// Identifier of a raw window, truncated to the minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(NaiveDateTime);

impl WindowId {
    /// Window identifier for the minute containing `at`
    pub fn at(at: NaiveDateTime) -> Self {
        let minute = at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        Self(minute)
    }

    /// Start of the window (minute resolution)
    pub fn start(&self) -> NaiveDateTime {
        self.0
    }

    /// `YYYYMMDD_HHMM`
    pub fn name(&self) -> String {
        self.0.format(WINDOW_NAME_FORMAT).to_string()
    }

    /// File name of the raw window log
    pub fn file_name(&self) -> String {
        format!("{}.{RAW_FILE_EXTENSION}", self.name())
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A window that has been flushed, closed and handed over for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedWindow {
    pub id: WindowId,
    pub path: PathBuf,
    /// Rows appended before sealing
    pub records: u64,
}
