//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration could not be loaded or failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Sensor transports could not be opened
    #[error("Ingestion setup failed: {0}")]
    Ingestion(#[from] ingestion::IngestionError),

    /// Raw window logging failed; acquisition stopped
    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] dispatcher::DispatcherError),

    /// Every file given to `process` was skipped
    #[error("No flux computed from {count} file(s)")]
    NothingProcessed { count: usize },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Load and validate a configuration file
pub fn load_blueprint(
    path: &std::path::Path,
) -> std::result::Result<contracts::StationBlueprint, CliError> {
    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
