//! Config validation
//!
//! Rules:
//! - sampling_hz > 0 and divides 1000 (integral slot width)
//! - tick_interval_ms > 0 and shorter than one sampling slot
//! - period_minutes > 0 and divides a day
//! - flux constants finite and non-zero, thresholds ordered
//! - steady-state segment shorter than a window
//! - output file names set and distinct
//! - sensor ids unique, transports well-formed

use contracts::{ContractError, SensorConfig, StationBlueprint, TransportConfig};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Validate a StationBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    validate_acquisition(blueprint)?;
    validate_rotation(blueprint)?;
    validate_flux(blueprint)?;
    validate_sensors(blueprint)?;
    Ok(())
}

/// Validate sampling cadence
fn validate_acquisition(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    let acquisition = &blueprint.acquisition;

    if acquisition.sampling_hz == 0 || 1000 % acquisition.sampling_hz != 0 {
        return Err(ContractError::config_validation(
            "acquisition.sampling_hz",
            format!(
                "sampling_hz must be > 0 and divide 1000, got {}",
                acquisition.sampling_hz
            ),
        ));
    }

    let slot = acquisition.slot_millis() as u64;
    if acquisition.tick_interval_ms == 0 || acquisition.tick_interval_ms >= slot {
        return Err(ContractError::config_validation(
            "acquisition.tick_interval_ms",
            format!(
                "tick_interval_ms must be in 1..{slot} (one sampling slot), got {}",
                acquisition.tick_interval_ms
            ),
        ));
    }

    Ok(())
}

/// Validate window rotation
fn validate_rotation(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    let period = blueprint.rotation.period_minutes;
    if period == 0 || MINUTES_PER_DAY % period != 0 {
        return Err(ContractError::config_validation(
            "rotation.period_minutes",
            format!("period_minutes must be > 0 and divide {MINUTES_PER_DAY}, got {period}"),
        ));
    }

    if blueprint.rotation.raw_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "rotation.raw_dir",
            "raw_dir cannot be empty",
        ));
    }

    Ok(())
}

/// Validate flux engine constants
fn validate_flux(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    let flux = &blueprint.flux;

    for (field, value) in [
        ("flux.concentration_scale", flux.concentration_scale),
        ("flux.flux_unit_conversion", flux.flux_unit_conversion),
    ] {
        if !value.is_finite() || value == 0.0 {
            return Err(ContractError::config_validation(
                field,
                format!("must be finite and non-zero, got {value}"),
            ));
        }
    }

    if !(flux.steady_threshold_low >= 0.0
        && flux.steady_threshold_low <= flux.steady_threshold_high
        && flux.steady_threshold_high.is_finite())
    {
        return Err(ContractError::config_validation(
            "flux.steady_threshold_low / flux.steady_threshold_high",
            format!(
                "thresholds must satisfy 0 <= low ({}) <= high ({})",
                flux.steady_threshold_low, flux.steady_threshold_high
            ),
        ));
    }

    if flux.steady_segment_minutes == 0
        || flux.steady_segment_minutes > blueprint.rotation.period_minutes
    {
        return Err(ContractError::config_validation(
            "flux.steady_segment_minutes",
            format!(
                "steady_segment_minutes must be in 1..={} (the rotation period), got {}",
                blueprint.rotation.period_minutes, flux.steady_segment_minutes
            ),
        ));
    }

    if flux.flux_file.is_empty() || flux.diagnostic_file.is_empty() {
        return Err(ContractError::config_validation(
            "flux.flux_file / flux.diagnostic_file",
            "output file names cannot be empty",
        ));
    }

    if flux.flux_file == flux.diagnostic_file {
        return Err(ContractError::config_validation(
            "flux.diagnostic_file",
            "diagnostic_file must differ from flux_file",
        ));
    }

    Ok(())
}

/// Validate sensor transports
fn validate_sensors(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    let sensors = &blueprint.sensors;
    validate_sensor("sensors.gas", &sensors.gas)?;
    validate_sensor("sensors.wind", &sensors.wind)?;

    if sensors.gas.id == sensors.wind.id {
        return Err(ContractError::config_validation(
            format!("sensors.wind[id={}]", sensors.wind.id),
            "duplicate sensor id",
        ));
    }

    Ok(())
}

fn validate_sensor(field: &str, sensor: &SensorConfig) -> Result<(), ContractError> {
    if sensor.id.is_empty() {
        return Err(ContractError::config_validation(
            format!("{field}.id"),
            "sensor id cannot be empty",
        ));
    }

    match &sensor.transport {
        TransportConfig::Device { path } if path.as_os_str().is_empty() => Err(
            ContractError::config_validation(format!("{field}.transport.path"), "path cannot be empty"),
        ),
        TransportConfig::Tcp { address, .. } if address.is_empty() => Err(
            ContractError::config_validation(
                format!("{field}.transport.address"),
                "address cannot be empty",
            ),
        ),
        TransportConfig::Mock { frequency_hz } if !(*frequency_hz > 0.0) => {
            Err(ContractError::config_validation(
                format!("{field}.transport.frequency_hz"),
                format!("frequency_hz must be > 0, got {frequency_hz}"),
            ))
        }
        _ => Ok(()),
    }
}
