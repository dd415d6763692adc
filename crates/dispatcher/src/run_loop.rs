//! AcquisitionLoop - the periodic tick driving emission and rotation

use std::sync::Arc;
use std::time::Duration;

use acquisition::Aggregator;
use contracts::{SealedWindow, StopSignal};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use crate::clock::Clock;
use crate::dispatcher::RotationDispatcher;
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;

/// Summary of one acquisition run
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    /// Loop iterations
    pub ticks: u64,
    /// Records emitted by the aggregator
    pub records_emitted: u64,
    /// Dispatcher counters at shutdown
    pub dispatch: MetricsSnapshot,
    /// Partial window sealed at shutdown
    pub last_window: Option<SealedWindow>,
}

/// Tick loop owning the aggregator's emitting side and the dispatcher
pub struct AcquisitionLoop {
    aggregator: Aggregator,
    dispatcher: RotationDispatcher,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl AcquisitionLoop {
    pub fn new(
        aggregator: Aggregator,
        dispatcher: RotationDispatcher,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            aggregator,
            dispatcher,
            clock,
            tick_interval,
        }
    }

    /// Run until the stop signal fires
    ///
    /// Each iteration applies the rotation rule, then asks the aggregator for
    /// a record and appends it. Raw log failures end the loop.
    #[instrument(name = "acquisition_loop_run", skip_all, fields(tick_ms = self.tick_interval.as_millis() as u64))]
    pub async fn run(mut self, stop: StopSignal) -> Result<LoopStats, DispatcherError> {
        info!(raw_dir = %self.dispatcher.raw_dir().display(), "acquisition loop started");

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks: u64 = 0;

        loop {
            interval.tick().await;
            if stop.is_stopped() {
                break;
            }
            ticks += 1;

            if let Err(e) = self.step() {
                error!(error = %e, "raw log failure, acquisition stopped");
                return Err(e);
            }

            if ticks % 10_000 == 0 {
                debug!(ticks, records = self.aggregator.emitted(), "acquisition progress");
            }
        }

        let records_emitted = self.aggregator.emitted();
        let metrics = self.dispatcher.metrics().clone();
        let last_window = self.dispatcher.shutdown().await?;
        let stats = LoopStats {
            ticks,
            records_emitted,
            dispatch: metrics.snapshot(),
            last_window,
        };
        info!(
            ticks = stats.ticks,
            records = stats.dispatch.records_written,
            windows_dispatched = stats.dispatch.windows_dispatched,
            "acquisition loop stopped"
        );
        Ok(stats)
    }

    fn step(&mut self) -> Result<(), DispatcherError> {
        let now = self.clock.now();
        self.dispatcher.check_rotation(now)?;
        // the aggregator lock is already released here
        if let Some(record) = self.aggregator.tick(now) {
            self.dispatcher.write(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatcher::DispatcherConfig;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use contracts::{ContractError, FluxReport, WindowAnalyzer};

    struct NeverAnalyzer;

    impl WindowAnalyzer for NeverAnalyzer {
        fn name(&self) -> &str {
            "never"
        }

        fn analyze(&self, window: &SealedWindow) -> Result<FluxReport, ContractError> {
            Err(ContractError::analysis(window.id.to_string(), "not expected"))
        }
    }

    #[tokio::test]
    async fn test_stop_seals_without_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 5, 0)
            .unwrap();
        let clock = ManualClock::stepping(start, ChronoDuration::milliseconds(100));
        let dispatcher = RotationDispatcher::new(
            DispatcherConfig {
                raw_dir: dir.path().to_path_buf(),
                period_minutes: 30,
            },
            Arc::new(NeverAnalyzer),
        );
        let run = AcquisitionLoop::new(
            Aggregator::new(10),
            dispatcher,
            Arc::new(clock.clone()),
            Duration::from_millis(1),
        );

        let stop = StopSignal::new();
        let task = tokio::spawn(run.run(stop.clone()));
        while clock.peek() < start + ChronoDuration::seconds(2) {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        stop.stop();

        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats.dispatch.windows_dispatched, 0);
        assert_eq!(stats.records_emitted, stats.dispatch.records_written);
        let last = stats.last_window.unwrap();
        assert_eq!(last.id.name(), "20240601_1005");
        assert!(last.records >= 20);
    }

    #[tokio::test]
    async fn test_raw_log_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the raw directory should be
        let blocked = dir.path().join("raw");
        std::fs::write(&blocked, b"").unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 5, 0)
            .unwrap();
        let dispatcher = RotationDispatcher::new(
            DispatcherConfig {
                raw_dir: blocked,
                period_minutes: 30,
            },
            Arc::new(NeverAnalyzer),
        );
        let run = AcquisitionLoop::new(
            Aggregator::new(10),
            dispatcher,
            Arc::new(ManualClock::new(start)),
            Duration::from_millis(1),
        );

        let err = run.run(StopSignal::new()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::RawLog { .. }));
    }
}
