//! Error types for the registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while reading or mutating the registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// I/O error on the backing store
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file could not be parsed or written
    #[error("Failed to parse registry YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Entry metadata failed validation
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Version string is not dotted numeric
    #[error("Invalid version '{0}': expected dotted numbers such as 1.2.0")]
    InvalidVersion(String),

    /// No entry with this name and version
    #[error("Entry not found: {name}@{version}")]
    NotFound { name: String, version: String },

    /// Path could not be made absolute
    #[error("Invalid path: {}", .path.display())]
    InvalidPath { path: PathBuf },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by `ExtractorRegistry::resolve`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// No registered entry matches
    #[error("No extractor registered as '{name}'{}", version_suffix(.version))]
    NotFound {
        name: String,
        version: Option<String>,
    },

    /// The implementation could not be read or parsed
    #[error("Failed to load {name}@{version}: {message}")]
    LoadFailure {
        name: String,
        version: String,
        message: String,
    },

    /// The implementation does not satisfy the extractor contract
    #[error("{name}@{version} does not satisfy the extractor contract: {message}")]
    ContractMismatch {
        name: String,
        version: String,
        message: String,
    },
}

fn version_suffix(version: &Option<String>) -> String {
    match version {
        Some(v) => format!(" with version {}", v),
        None => String::new(),
    }
}
