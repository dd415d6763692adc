//! RotationDispatcher - owns the open window and hands sealed windows to the analyzer

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{CombinedRecord, RotationConfig, SealedWindow, WindowAnalyzer};

use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;
use crate::rotation::{should_rotate, RotationState};
use crate::writer::WindowWriter;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Directory receiving raw window files
    pub raw_dir: PathBuf,
    /// Rotation period (minutes)
    pub period_minutes: u32,
}

impl From<&RotationConfig> for DispatcherConfig {
    fn from(config: &RotationConfig) -> Self {
        Self {
            raw_dir: config.raw_dir.clone(),
            period_minutes: config.period_minutes,
        }
    }
}

/// Window writer plus rotation rule
///
/// At most one window is open. A window is sealed and dispatched at most once,
/// on the first tick that observes its closing boundary.
pub struct RotationDispatcher {
    config: DispatcherConfig,
    analyzer: Arc<dyn WindowAnalyzer>,
    state: RotationState,
    writer: Option<WindowWriter>,
    metrics: Arc<DispatchMetrics>,
    in_flight: Vec<JoinHandle<()>>,
}

impl RotationDispatcher {
    pub fn new(config: DispatcherConfig, analyzer: Arc<dyn WindowAnalyzer>) -> Self {
        Self {
            config,
            analyzer,
            state: RotationState::new(),
            writer: None,
            metrics: Arc::new(DispatchMetrics::new()),
            in_flight: Vec::new(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.config.raw_dir
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Analyses not yet finished
    pub fn in_flight(&mut self) -> usize {
        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.len()
    }

    /// Apply the rotation rule for `now`
    ///
    /// On a boundary the open window is sealed, handed to the analyzer on a
    /// detached task, and a new window named after `now` is opened.
    /// Must be called from within a tokio runtime.
    pub fn check_rotation(
        &mut self,
        now: NaiveDateTime,
    ) -> Result<Option<SealedWindow>, DispatcherError> {
        if !should_rotate(now, self.config.period_minutes, self.state.current_file()) {
            return Ok(None);
        }

        let sealed = self.seal_current()?;
        if let Some(window) = &sealed {
            self.dispatch(window.clone());
        }
        self.open_window(now)?;
        Ok(sealed)
    }

    /// Append a record, opening the first window lazily
    pub fn write(&mut self, record: &CombinedRecord) -> Result<(), DispatcherError> {
        if self.writer.is_none() {
            self.open_window(record.timestamp)?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.append(record)?;
            self.metrics.inc_records_written();
        }
        Ok(())
    }

    /// Seal the open window without dispatching it and wait for running analyses
    #[instrument(name = "rotation_dispatcher_shutdown", skip(self))]
    pub async fn shutdown(mut self) -> Result<Option<SealedWindow>, DispatcherError> {
        let sealed = self.seal_current()?;
        if let Some(window) = &sealed {
            info!(
                window = %window.id,
                records = window.records,
                "partial window sealed, not analyzed"
            );
        }
        self.wait_for_analyses().await;
        Ok(sealed)
    }

    /// Wait for every dispatched analysis to finish
    pub async fn wait_for_analyses(&mut self) {
        for handle in self.in_flight.drain(..) {
            // supervision already logged the outcome
            let _ = handle.await;
        }
    }

    fn open_window(&mut self, now: NaiveDateTime) -> Result<(), DispatcherError> {
        let id = self.state.open(now);
        let writer = WindowWriter::open(&self.config.raw_dir, id)?;
        self.metrics.inc_windows_opened();
        info!(window = %id, path = %writer.path().display(), "window opened");
        self.writer = Some(writer);
        Ok(())
    }

    fn seal_current(&mut self) -> Result<Option<SealedWindow>, DispatcherError> {
        self.state.close();
        match self.writer.take() {
            Some(writer) => {
                let sealed = writer.seal()?;
                debug!(window = %sealed.id, records = sealed.records, "window sealed");
                Ok(Some(sealed))
            }
            None => Ok(None),
        }
    }

    fn dispatch(&mut self, window: SealedWindow) {
        self.metrics.inc_windows_dispatched();
        info!(
            window = %window.id,
            records = window.records,
            analyzer = %self.analyzer.name(),
            "window dispatched"
        );
        self.in_flight.retain(|h| !h.is_finished());
        let handle = tokio::spawn(supervise_analysis(
            self.analyzer.clone(),
            window,
            self.metrics.clone(),
        ));
        self.in_flight.push(handle);
    }
}

/// Run one analysis on the blocking pool, containing every failure
async fn supervise_analysis(
    analyzer: Arc<dyn WindowAnalyzer>,
    window: SealedWindow,
    metrics: Arc<DispatchMetrics>,
) {
    let id = window.id;
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&window)).await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(Ok(report)) => {
            metrics.inc_windows_analyzed();
            metrics::histogram!("ec_flux_analysis_duration_seconds").record(elapsed);
            info!(
                window = %id,
                flux = report.record.flux,
                friction_velocity = report.record.friction_velocity,
                flux_lag = report.flux_lag,
                steady_state = report.record.turbulent_steady_state.code(),
                samples = report.samples,
                elapsed_s = elapsed,
                "window analyzed"
            );
        }
        Ok(Err(e)) => {
            metrics.inc_windows_failed();
            warn!(window = %id, error = %e, "window skipped");
        }
        Err(e) => {
            metrics.inc_windows_failed();
            error!(window = %id, error = %e, "analysis task panicked");
        }
    }
}
