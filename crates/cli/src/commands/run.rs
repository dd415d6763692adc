//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{StationBlueprint, StopSignal, TransportConfig};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::load_blueprint;
use crate::pipeline::{RunConfig, Station};

/// Execute the `run` command
pub async fn run_station(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(ref raw_dir) = args.raw_dir {
        info!(raw_dir = %raw_dir.display(), "Overriding raw directory from CLI");
        blueprint.rotation.raw_dir = raw_dir.clone();
    }
    if let Some(ref output_dir) = args.output_dir {
        info!(output_dir = %output_dir.display(), "Overriding output directory from CLI");
        blueprint.flux.output_dir = output_dir.clone();
    }

    info!(
        station = %blueprint.station.name,
        sampling_hz = blueprint.acquisition.sampling_hz,
        period_minutes = blueprint.rotation.period_minutes,
        raw_dir = %blueprint.rotation.raw_dir.display(),
        output_dir = %blueprint.flux.output_dir.display(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let run_config = RunConfig {
        blueprint,
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    let stop = StopSignal::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping station...");
        signal_stop.stop();
    });

    info!("Starting station...");
    let stats = Station::new(run_config)
        .run(stop)
        .await
        .context("Station execution failed")?;

    info!(
        records = stats.records_written(),
        duration_secs = stats.duration.as_secs_f64(),
        records_per_second = format!("{:.2}", stats.records_per_second()),
        "Station finished"
    );
    stats.print_summary();

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// One-line description of a sensor transport
pub fn describe_transport(transport: &TransportConfig) -> String {
    match transport {
        TransportConfig::Device { path } => format!("device {}", path.display()),
        TransportConfig::Tcp {
            address,
            read_timeout_ms,
        } => format!("tcp {address} (timeout {read_timeout_ms} ms)"),
        TransportConfig::Mock { frequency_hz } => format!("mock @ {frequency_hz} Hz"),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &StationBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Station: {}", blueprint.station.name);
    println!(
        "Acquisition: {} Hz, tick {} ms",
        blueprint.acquisition.sampling_hz, blueprint.acquisition.tick_interval_ms
    );
    println!(
        "Rotation: every {} min into {}",
        blueprint.rotation.period_minutes,
        blueprint.rotation.raw_dir.display()
    );
    println!(
        "Flux output: {}/{{{}, {}}}",
        blueprint.flux.output_dir.display(),
        blueprint.flux.flux_file,
        blueprint.flux.diagnostic_file
    );
    println!("\nSensors:");
    for sensor in [&blueprint.sensors.gas, &blueprint.sensors.wind] {
        println!("  - {} ({})", sensor.id, describe_transport(&sensor.transport));
    }
    println!();
}
