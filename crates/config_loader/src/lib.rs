//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `StationBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("station.toml")).unwrap();
//! println!("Rotation: {} min", blueprint.rotation.period_minutes);
//! ```

mod parser;
mod validator;

pub use contracts::StationBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<StationBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<StationBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built blueprint (defaults or programmatic overrides)
    pub fn validate(blueprint: &StationBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize StationBlueprint to TOML string
    pub fn to_toml(blueprint: &StationBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize StationBlueprint to JSON string
    pub fn to_json(blueprint: &StationBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<StationBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[station]
name = "paddy-east"

[acquisition]
sampling_hz = 10
tick_interval_ms = 10

[rotation]
period_minutes = 30
raw_dir = "./OpenFlux_data"

[flux]
output_dir = "./EC_FLUX"
steady_threshold_low = 0.3
steady_threshold_high = 1.0

[sensors.gas]
id = "ht8x00"
transport = { kind = "device", path = "/dev/ttyUSB0" }

[sensors.wind]
id = "sonic"
transport = { kind = "mock", frequency_hz = 20.0 }
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.station.name, "paddy-east");
        assert_eq!(bp.rotation.period_minutes, 30);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.station.name, bp2.station.name);
        assert_eq!(bp.sensors.gas.transport, bp2.sensors.gas.transport);
        assert_eq!(bp.flux.flux_file, bp2.flux.flux_file);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.sensors.wind.id, bp2.sensors.wind.id);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[rotation]
period_minutes = 45
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("period_minutes"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.toml");
        std::fs::write(&path, MINIMAL_TOML).unwrap();
        let bp = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(bp.sensors.gas.id, "ht8x00");

        let yaml = dir.path().join("station.yaml");
        std::fs::write(&yaml, "").unwrap();
        let err = ConfigLoader::load_from_path(&yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
