//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::StationBlueprint;
use flux_engine::FluxConstants;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::commands::run::describe_transport;
use crate::error::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    station: String,
    acquisition: AcquisitionInfo,
    rotation: RotationInfo,
    flux: FluxInfo,
    sensors: Vec<SensorInfo>,
}

#[derive(Serialize)]
struct AcquisitionInfo {
    sampling_hz: u32,
    slot_millis: i64,
    tick_interval_ms: u64,
}

#[derive(Serialize)]
struct RotationInfo {
    period_minutes: u32,
    raw_dir: String,
    /// Records in a complete window
    expected_records: u64,
}

#[derive(Serialize)]
struct FluxInfo {
    output_dir: String,
    flux_file: String,
    diagnostic_file: String,
    lag_half_width: usize,
    required_samples: usize,
    steady_segment_samples: usize,
    concentration_scale: f64,
    flux_unit_conversion: f64,
    steady_thresholds: (f64, f64),
    #[serde(skip_serializing_if = "Option::is_none")]
    supplemental_path: Option<String>,
}

#[derive(Serialize)]
struct SensorInfo {
    channel: &'static str,
    id: String,
    transport: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.resolved {
        print!("{}", render_resolved(&blueprint, args.json)?);
        return Ok(());
    }

    let info = build_config_info(&blueprint);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

/// Effective configuration with every default filled in
fn render_resolved(blueprint: &StationBlueprint, json: bool) -> Result<String> {
    let rendered = if json {
        let mut text = ConfigLoader::to_json(blueprint)?;
        text.push('\n');
        text
    } else {
        ConfigLoader::to_toml(blueprint)?
    };
    Ok(rendered)
}

fn build_config_info(blueprint: &StationBlueprint) -> ConfigInfo {
    let constants = FluxConstants::from(blueprint);
    let flux = &blueprint.flux;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        station: blueprint.station.name.clone(),
        acquisition: AcquisitionInfo {
            sampling_hz: blueprint.acquisition.sampling_hz,
            slot_millis: blueprint.acquisition.slot_millis(),
            tick_interval_ms: blueprint.acquisition.tick_interval_ms,
        },
        rotation: RotationInfo {
            period_minutes: blueprint.rotation.period_minutes,
            raw_dir: blueprint.rotation.raw_dir.display().to_string(),
            expected_records: u64::from(blueprint.rotation.period_minutes)
                * 60
                * u64::from(blueprint.acquisition.sampling_hz),
        },
        flux: FluxInfo {
            output_dir: flux.output_dir.display().to_string(),
            flux_file: flux.flux_file.clone(),
            diagnostic_file: flux.diagnostic_file.clone(),
            lag_half_width: constants.lag_half_width(),
            required_samples: constants.required_samples(),
            steady_segment_samples: constants.steady_segment_len(),
            concentration_scale: constants.concentration_scale,
            flux_unit_conversion: constants.flux_unit_conversion,
            steady_thresholds: (
                constants.steady_threshold_low,
                constants.steady_threshold_high,
            ),
            supplemental_path: flux
                .supplemental_path
                .as_ref()
                .map(|p| p.display().to_string()),
        },
        sensors: vec![
            SensorInfo {
                channel: "gas",
                id: blueprint.sensors.gas.id.clone(),
                transport: describe_transport(&blueprint.sensors.gas.transport),
            },
            SensorInfo {
                channel: "wind",
                id: blueprint.sensors.wind.id.clone(),
                transport: describe_transport(&blueprint.sensors.wind.transport),
            },
        ],
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                EC Flux Station Configuration                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Station");
    println!("   ├─ Version: {}", info.version);
    println!("   └─ Name: {}", info.station);

    let acquisition = &info.acquisition;
    println!("\n⏱  Acquisition");
    println!("   ├─ Sampling: {} Hz", acquisition.sampling_hz);
    println!("   ├─ Slot: {} ms", acquisition.slot_millis);
    println!("   └─ Tick: {} ms", acquisition.tick_interval_ms);

    let rotation = &info.rotation;
    println!("\n🗂  Rotation");
    println!("   ├─ Period: {} min", rotation.period_minutes);
    println!("   ├─ Raw directory: {}", rotation.raw_dir);
    println!("   └─ Records per window: {}", rotation.expected_records);

    let flux = &info.flux;
    println!("\n📈 Flux");
    println!("   ├─ Output: {}", flux.output_dir);
    println!("   ├─ Files: {}, {}", flux.flux_file, flux.diagnostic_file);
    println!("   ├─ Lag search: ±{} samples", flux.lag_half_width);
    println!("   ├─ Minimum samples: {}", flux.required_samples);
    println!("   ├─ Steady segment: {} samples", flux.steady_segment_samples);
    println!(
        "   ├─ Thresholds: {} / {}",
        flux.steady_thresholds.0, flux.steady_thresholds.1
    );
    match &flux.supplemental_path {
        Some(path) => println!("   └─ Supplemental: {}", path),
        None => println!("   └─ Supplemental: none"),
    }

    println!("\n📡 Sensors ({})", info.sensors.len());
    for (i, sensor) in info.sensors.iter().enumerate() {
        let prefix = if i == info.sensors.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} {} [{}] {}",
            prefix, sensor.id, sensor.channel, sensor.transport
        );
    }

    println!();
}
