//! Error types for Exforge Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid example: {0}")]
    InvalidExample(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
