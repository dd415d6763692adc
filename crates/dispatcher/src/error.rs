//! Dispatcher error types

use std::path::PathBuf;

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Raw window log could not be written; fatal to acquisition
    #[error("raw log error at {}: {source}", path.display())]
    RawLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a raw log error
    pub fn raw_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RawLog {
            path: path.into(),
            source,
        }
    }
}
