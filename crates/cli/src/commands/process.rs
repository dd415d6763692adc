//! `process` command implementation.
//!
//! Recomputes flux for existing raw window files and appends the results to
//! the configured outputs.

use anyhow::{Context, Result};
use contracts::StationBlueprint;
use flux_engine::FluxEngine;
use observability::FluxMetricsAggregator;
use tracing::{info, warn};

use crate::cli::ProcessArgs;
use crate::error::{load_blueprint, CliError};

/// Execute the `process` command
pub fn run_process(args: &ProcessArgs) -> Result<()> {
    let mut blueprint = match &args.config {
        Some(path) => load_blueprint(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StationBlueprint::default(),
    };
    if let Some(ref output_dir) = args.output_dir {
        blueprint.flux.output_dir = output_dir.clone();
    }

    let engine = FluxEngine::from_blueprint(&blueprint);
    info!(
        files = args.files.len(),
        output = %engine.output().flux_path().display(),
        "Reprocessing raw windows"
    );

    let aggregator = process_files(&engine, args)?;
    if aggregator.total_windows == 0 {
        return Err(CliError::NothingProcessed {
            count: args.files.len(),
        }
        .into());
    }

    if !args.json {
        print!("{}", aggregator.summary());
    }
    Ok(())
}

fn process_files(engine: &FluxEngine, args: &ProcessArgs) -> Result<FluxMetricsAggregator> {
    let mut aggregator = FluxMetricsAggregator::new();

    for path in &args.files {
        match engine.process_file(path) {
            Ok(report) => {
                aggregator.update(&report);
                if args.json {
                    let json = serde_json::to_string(&report)
                        .context("Failed to serialize flux report")?;
                    println!("{}", json);
                } else {
                    println!(
                        "{}: flux={:.6} u*={:.4} lag={} class={}",
                        path.display(),
                        report.record.flux,
                        report.record.friction_velocity,
                        report.flux_lag,
                        report.record.turbulent_steady_state.code()
                    );
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Window skipped");
                aggregator.record_failure();
            }
        }
    }

    Ok(aggregator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RAW_HEADER;
    use std::fmt::Write as _;
    use std::path::PathBuf;

    fn write_window(path: &std::path::Path, rows: usize) {
        let mut text = format!("{RAW_HEADER}\n");
        for i in 0..rows {
            let w = ((i * 7919) % 101) as f64 / 100.0 - 0.5;
            let _ = writeln!(
                text,
                "2024-06-01 12:00:{:02}.{}00,{},24,88,2.0,0.4,{},20",
                (i / 10) % 60,
                i % 10,
                16.0 * (30.0 + 10.0 * w),
                w
            );
        }
        std::fs::write(path, text).unwrap();
    }

    fn args(files: Vec<PathBuf>, output_dir: PathBuf) -> ProcessArgs {
        ProcessArgs {
            files,
            config: None,
            output_dir: Some(output_dir),
            json: true,
        }
    }

    #[test]
    fn test_process_mixed_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("20240601_1200.csv");
        let short = dir.path().join("20240601_1230.csv");
        write_window(&good, 600);
        write_window(&short, 5);

        let args = args(vec![good, short], dir.path().join("out"));
        let mut blueprint = StationBlueprint::default();
        blueprint.flux.output_dir = dir.path().join("out");
        let engine = FluxEngine::from_blueprint(&blueprint);

        let aggregator = process_files(&engine, &args).unwrap();
        assert_eq!(aggregator.total_windows, 1);
        assert_eq!(aggregator.failed_windows, 1);
        assert!(dir.path().join("out").join("EC_FLUX.csv").exists());
    }

    #[test]
    fn test_nothing_processed_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(
            vec![dir.path().join("missing.csv")],
            dir.path().join("out"),
        );
        let err = run_process(&args).unwrap_err();
        assert!(err.to_string().contains("No flux computed"));
    }
}
