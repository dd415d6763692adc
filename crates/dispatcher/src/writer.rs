//! WindowWriter - appends combined records to the open raw window log

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{CombinedRecord, SealedWindow, WindowId, RAW_HEADER};
use tracing::{debug, instrument};

use crate::error::DispatcherError;

/// Single writer of one raw window file
pub struct WindowWriter {
    id: WindowId,
    path: PathBuf,
    file: BufWriter<File>,
    records: u64,
}

impl WindowWriter {
    /// Open (or continue) the window file `<raw_dir>/<YYYYMMDD_HHMM>.csv`
    ///
    /// The header row is written when the file is new or empty.
    #[instrument(name = "window_writer_open", skip(raw_dir), fields(window = %id))]
    pub fn open(raw_dir: &Path, id: WindowId) -> Result<Self, DispatcherError> {
        let path = raw_dir.join(id.file_name());
        fs::create_dir_all(raw_dir).map_err(|e| DispatcherError::raw_log(raw_dir, e))?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DispatcherError::raw_log(&path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| DispatcherError::raw_log(&path, e))?
            .len()
            == 0;

        let mut writer = Self {
            id,
            path,
            file: BufWriter::new(file),
            records: 0,
        };
        if is_new {
            writer.write_line(RAW_HEADER)?;
        }
        debug!(path = %writer.path.display(), is_new, "window file opened");
        Ok(writer)
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// File name of the open window
    pub fn file_name(&self) -> String {
        self.id.file_name()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Append one record and flush
    pub fn append(&mut self, record: &CombinedRecord) -> Result<(), DispatcherError> {
        self.write_line(&record.to_csv_row())?;
        self.records += 1;
        Ok(())
    }

    /// Flush and close the file
    pub fn seal(self) -> Result<SealedWindow, DispatcherError> {
        let file = self
            .file
            .into_inner()
            .map_err(|e| DispatcherError::raw_log(&self.path, e.into_error()))?;
        file.sync_data()
            .map_err(|e| DispatcherError::raw_log(&self.path, e))?;
        drop(file);

        Ok(SealedWindow {
            id: self.id,
            path: self.path,
            records: self.records,
        })
    }

    fn write_line(&mut self, line: &str) -> Result<(), DispatcherError> {
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|e| DispatcherError::raw_log(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use contracts::{LatestReadings, WindSample};
    use tempfile::tempdir;

    fn at(h: u32, m: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_milli_opt(h, m, 0, ms)
            .unwrap()
    }

    fn record(ts: NaiveDateTime, w: f64) -> CombinedRecord {
        let readings = LatestReadings {
            gas: None,
            wind: Some(WindSample {
                u: 1.0,
                v: 0.0,
                w,
                sonic_temperature: 20.0,
            }),
        };
        CombinedRecord::merge(ts, &readings)
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempdir().unwrap();
        let id = WindowId::at(at(12, 0, 0));
        let mut writer = WindowWriter::open(dir.path(), id).unwrap();
        writer.append(&record(at(12, 0, 0), 0.1)).unwrap();
        writer.append(&record(at(12, 0, 100), 0.2)).unwrap();

        // flushed after each row, readable before sealing
        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 3);

        let sealed = writer.seal().unwrap();
        assert_eq!(sealed.records, 2);
        assert_eq!(sealed.path, dir.path().join("20240601_1200.csv"));

        let content = fs::read_to_string(&sealed.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], RAW_HEADER);
        let parsed = CombinedRecord::parse_csv_row(lines[2]).unwrap();
        assert_eq!(parsed.w, Some(0.2));
        assert_eq!(parsed.concentration, None);
    }

    #[test]
    fn test_reopen_does_not_repeat_header() {
        let dir = tempdir().unwrap();
        let id = WindowId::at(at(8, 30, 0));

        let mut first = WindowWriter::open(dir.path(), id).unwrap();
        first.append(&record(at(8, 30, 0), 0.1)).unwrap();
        first.seal().unwrap();

        let mut second = WindowWriter::open(dir.path(), id).unwrap();
        second.append(&record(at(8, 30, 100), 0.2)).unwrap();
        let sealed = second.seal().unwrap();

        let content = fs::read_to_string(&sealed.path).unwrap();
        assert_eq!(content.matches("TIMESTAMP").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_creates_raw_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("OpenFlux_data");
        let writer = WindowWriter::open(&nested, WindowId::at(at(0, 0, 0))).unwrap();
        assert!(nested.is_dir());
        assert_eq!(writer.file_name(), "20240601_0000.csv");
    }
}
