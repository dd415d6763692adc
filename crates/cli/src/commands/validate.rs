//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{StationBlueprint, TransportConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::commands::run::describe_transport;
use crate::error::load_blueprint;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    station: String,
    sampling_hz: u32,
    period_minutes: u32,
    gas_transport: String,
    wind_transport: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    station: blueprint.station.name.clone(),
                    sampling_hz: blueprint.acquisition.sampling_hz,
                    period_minutes: blueprint.rotation.period_minutes,
                    gas_transport: describe_transport(&blueprint.sensors.gas.transport),
                    wind_transport: describe_transport(&blueprint.sensors.wind.transport),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &StationBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    for sensor in [&blueprint.sensors.gas, &blueprint.sensors.wind] {
        if matches!(sensor.transport, TransportConfig::Mock { .. }) {
            warnings.push(format!(
                "Sensor '{}' uses the mock transport - readings are synthetic",
                sensor.id
            ));
        }
    }

    if let Some(ref supplemental) = blueprint.flux.supplemental_path {
        if !supplemental.exists() {
            warnings.push(format!(
                "flux.supplemental_path {} does not exist - every window will be skipped",
                supplemental.display()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Station: {}", summary.station);
            println!("  Sampling: {} Hz", summary.sampling_hz);
            println!("  Period: {} min", summary.period_minutes);
            println!("  Gas analyzer: {}", summary.gas_transport);
            println!("  Anemometer: {}", summary.wind_transport);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
