//! Station run statistics.

use std::time::Duration;

use dispatcher::LoopStats;
use observability::FluxMetricsAggregator;

/// Statistics from one station run
#[derive(Debug, Clone, Default)]
pub struct StationStats {
    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Registered sensor drivers
    pub active_sensors: usize,

    /// Samples delivered by the drivers
    pub samples_received: u64,

    /// Frames that failed to decode
    pub decode_errors: u64,

    /// Sensors whose transport failed
    pub transport_errors: u64,

    /// Tick loop summary (None when stopped before the first sample)
    pub acquisition: Option<LoopStats>,

    /// Per-window flux results
    pub flux: FluxMetricsAggregator,
}

impl StationStats {
    /// Raw records written
    pub fn records_written(&self) -> u64 {
        self.acquisition
            .as_ref()
            .map_or(0, |s| s.dispatch.records_written)
    }

    /// Records per second throughput
    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records_written() as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Station Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Acquisition");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Active sensors: {}", self.active_sensors);
        println!("   ├─ Samples received: {}", self.samples_received);
        println!("   ├─ Decode errors: {}", self.decode_errors);
        println!("   ├─ Transport errors: {}", self.transport_errors);
        println!("   ├─ Records written: {}", self.records_written());
        println!("   └─ Records/s: {:.2}", self.records_per_second());

        if let Some(acquisition) = &self.acquisition {
            let dispatch = &acquisition.dispatch;
            println!("\n🗂  Windows");
            println!("   ├─ Opened: {}", dispatch.windows_opened);
            println!("   ├─ Dispatched: {}", dispatch.windows_dispatched);
            println!("   ├─ Analysed: {}", dispatch.windows_analyzed);
            println!("   ├─ Failed: {}", dispatch.windows_failed);
            match &acquisition.last_window {
                Some(window) => println!(
                    "   └─ Partial (not analysed): {} ({} records)",
                    window.id, window.records
                ),
                None => println!("   └─ Partial (not analysed): none"),
            }
        }

        let summary = self.flux.summary();
        println!("\n📈 Flux");
        println!(
            "   ├─ Steady state: steady={}, moderate={}, unsteady={}",
            summary.steady, summary.moderate, summary.unsteady
        );
        println!("   ├─ Flux: {}", summary.flux);
        println!("   ├─ Friction velocity: {}", summary.friction_velocity);
        println!("   └─ Lag (samples): {}", summary.lag_samples);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher::MetricsSnapshot;

    #[test]
    fn test_records_per_second() {
        let stats = StationStats {
            duration: Duration::from_secs(10),
            acquisition: Some(LoopStats {
                dispatch: MetricsSnapshot {
                    records_written: 100,
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(stats.records_written(), 100);
        assert!((stats.records_per_second() - 10.0).abs() < 1e-9);
        assert_eq!(StationStats::default().records_per_second(), 0.0);
    }
}
