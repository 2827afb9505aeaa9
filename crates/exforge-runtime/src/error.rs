//! Runtime error types

use exforge_core::CoreError;
use exforge_parser::ParseError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Document does not expose a usable `extract(input: record) -> record`
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Invoked operation does not exist
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Called function is not a built-in
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments for an operation or function
    #[error("{callee} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        callee: String,
        expected: String,
        actual: usize,
    },

    /// A function received a value it cannot handle
    #[error("{function}: {message}")]
    TypeError { function: String, message: String },

    /// Invocation chain exceeded the depth limit
    #[error("Call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    /// Source document failed to parse
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl RuntimeError {
    pub(crate) fn type_error(function: &str, message: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

impl From<RuntimeError> for CoreError {
    fn from(err: RuntimeError) -> Self {
        CoreError::ExtractionFailed(err.to_string())
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
