//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Transport could not be opened
    #[error("failed to open transport for sensor {sensor_id}: {message}")]
    OpenFailed {
        /// Sensor ID
        sensor_id: String,
        /// Error message
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// No driver registered for a channel
    #[error("no driver registered for the {channel} channel")]
    MissingChannel {
        /// Channel label
        channel: &'static str,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
