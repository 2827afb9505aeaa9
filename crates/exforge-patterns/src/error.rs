//! Pattern filtering error types

use thiserror::Error;

/// Errors raised while configuring or applying a confidence filter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Threshold outside `[0, 1]` or NaN
    #[error("Invalid confidence threshold {0}: must be between 0.0 and 1.0")]
    InvalidThreshold(f64),

    /// The custom preset was selected without a threshold value
    #[error("Custom threshold preset requires an explicit threshold value")]
    MissingCustomThreshold,

    /// Preset name not recognised
    #[error("Unknown threshold preset: {0}")]
    UnknownPreset(String),
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
