//! FluxOutput - appends flux and diagnostic rows
//!
//! Both files are appended under one lock so rows of concurrently analysed
//! windows never interleave.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use contracts::{FluxReport, FLUX_HEADER};
use tracing::{debug, warn};

use crate::error::FluxError;

/// Flux CSV and cross-covariance diagnostic writer
#[derive(Debug)]
pub struct FluxOutput {
    flux_path: PathBuf,
    diagnostic_path: PathBuf,
    lock: Mutex<()>,
}

impl FluxOutput {
    pub fn new(output_dir: &Path, flux_file: &str, diagnostic_file: &str) -> Self {
        Self {
            flux_path: output_dir.join(flux_file),
            diagnostic_path: output_dir.join(diagnostic_file),
            lock: Mutex::new(()),
        }
    }

    pub fn flux_path(&self) -> &Path {
        &self.flux_path
    }

    pub fn diagnostic_path(&self) -> &Path {
        &self.diagnostic_path
    }

    /// Append one report to both files
    ///
    /// Both files are opened and both rows rendered before anything is
    /// written, so a missing directory or unwritable file leaves neither
    /// file changed.
    pub fn append(&self, report: &FluxReport) -> Result<(), FluxError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let header = std::iter::once("time".to_string())
            .chain(report.curve.lag_labels())
            .collect::<Vec<_>>()
            .join("\t");
        let row = std::iter::once(report.record.timestamp.clone())
            .chain(report.curve.covariances().iter().map(f64::to_string))
            .collect::<Vec<_>>()
            .join("\t");
        let diagnostic = PendingRow::open(&self.diagnostic_path, &header, &row)?;
        let flux = PendingRow::open(&self.flux_path, FLUX_HEADER, &report.record.to_csv_row())?;

        flux.commit()?;
        if let Err(e) = diagnostic.commit() {
            warn!(
                flux_path = %self.flux_path.display(),
                diagnostic_path = %self.diagnostic_path.display(),
                timestamp = %report.record.timestamp,
                error = %e,
                "flux row written without its diagnostic row"
            );
            return Err(e);
        }

        debug!(
            flux_path = %self.flux_path.display(),
            timestamp = %report.record.timestamp,
            "flux rows appended"
        );
        Ok(())
    }
}

/// An opened output file and the text to append to it
struct PendingRow<'a> {
    path: &'a Path,
    file: File,
    text: String,
}

impl<'a> PendingRow<'a> {
    /// Open `path` for appending; `header` is prepended when the file is new or empty
    fn open(path: &'a Path, header: &str, row: &str) -> Result<Self, FluxError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FluxError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| FluxError::io(path, e))?;
        let is_new = file.metadata().map_err(|e| FluxError::io(path, e))?.len() == 0;

        let mut text = String::new();
        if is_new {
            text.push_str(header);
            text.push('\n');
        }
        text.push_str(row);
        text.push('\n');
        Ok(Self { path, file, text })
    }

    fn commit(mut self) -> Result<(), FluxError> {
        self.file
            .write_all(self.text.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| FluxError::io(self.path, e))
    }
}
