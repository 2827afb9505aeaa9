//! Error types for the model boundary

use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// LLM module errors
#[derive(Debug, Error)]
pub enum LLMError {
    /// External API call failed
    #[error("External API call failed: {0}")]
    ApiCallFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response did not contain what was asked for
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Scripted provider ran out of responses
    #[error("Mock provider script exhausted after {0} calls")]
    ScriptExhausted(usize),
}
