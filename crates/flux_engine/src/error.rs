//! Flux engine error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Reasons a window produces no flux record
#[derive(Debug, Error)]
pub enum FluxError {
    /// Input or output file could not be read or written
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No row survived cleaning
    #[error("window {} has no usable rows", path.display())]
    EmptyWindow { path: PathBuf },

    /// Too few rows for the lag search
    #[error("insufficient samples: found {found}, required {required}")]
    InsufficientSamples { found: usize, required: usize },

    /// A fluctuation series has zero variance
    #[error("degenerate series: {series} has zero variance")]
    DegenerateSeries { series: &'static str },
}

impl FluxError {
    /// Create an io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert into the analyzer contract error for window `window`
    pub fn into_contract(self, window: impl Into<String>) -> ContractError {
        match self {
            Self::Io { source, .. } => ContractError::Io(source),
            other => ContractError::analysis(window, other.to_string()),
        }
    }
}
