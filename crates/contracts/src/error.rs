//! Layered error definitions
//!
//! Categorized by source: config / decode / transport / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sensor Errors =====
    /// Frame could not be decoded into a sample
    #[error("frame decode error for sensor '{sensor}': {message}")]
    FrameDecode { sensor: String, message: String },

    /// Transport failed (device unplugged, connection reset, ...)
    #[error("transport error for sensor '{sensor}': {message}")]
    Transport { sensor: String, message: String },

    // ===== Record Errors =====
    /// Raw window row could not be parsed
    #[error("raw record parse error: {message}")]
    RecordParse { message: String },

    // ===== Analysis Errors =====
    /// Window analysis failed
    #[error("analysis of window '{window}' failed: {message}")]
    Analysis { window: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create frame decode error
    pub fn frame_decode(sensor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FrameDecode {
            sensor: sensor.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(sensor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            sensor: sensor.into(),
            message: message.into(),
        }
    }

    /// Create raw record parse error
    pub fn record_parse(message: impl Into<String>) -> Self {
        Self::RecordParse {
            message: message.into(),
        }
    }

    /// Create analysis error
    pub fn analysis(window: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Analysis {
            window: window.into(),
            message: message.into(),
        }
    }

    /// Whether the error only affects a single frame (the driver may keep polling)
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::FrameDecode { .. })
    }
}
