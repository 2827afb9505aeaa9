//! Validator error types

use std::path::PathBuf;
use thiserror::Error;

/// Validator error
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// Source file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Source file cannot be read due to permissions
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other I/O failure while reading source
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Enforcer configuration rejected
    #[error("Invalid enforcer configuration: {0}")]
    InvalidConfig(String),
}

impl ValidatorError {
    /// Classify an I/O error raised while reading `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => ValidatorError::FileNotFound(path),
            std::io::ErrorKind::PermissionDenied => ValidatorError::PermissionDenied(path),
            _ => ValidatorError::Io { path, source: err },
        }
    }
}

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;
