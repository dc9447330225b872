//! CLI error types

use thiserror::Error;

/// Errors raised by the command line front end
#[derive(Debug, Error)]
pub enum CliError {
    /// Transport name not registered (or feature disabled)
    #[error("Unknown transport: {0}")]
    UnknownTransport(String),

    /// Transport options could not be parsed
    #[error("Invalid {transport} parameters: {message}")]
    InvalidOptions { transport: String, message: String },

    /// Chip generation name not recognised
    #[error("Unknown chip: {0} (expected ft800, ft801, ft810, ft811, ft812 or ft813)")]
    UnknownChip(String),

    /// The coprocessor reported a zero calibration result
    #[error("Touch panel calibration failed")]
    CalibrationFailed,

    /// Chip or transport failure
    #[error(transparent)]
    Device(#[from] rft8xx_core::Error),
}
