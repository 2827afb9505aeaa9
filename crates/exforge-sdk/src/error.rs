//! SDK error types

use crate::report::SynthesisReport;
use crate::state::{SynthesisEvent, SynthesisState};
use exforge_patterns::FilterError;
use exforge_registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while touching the filesystem or registry during a run
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ResourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResourceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// SDK error type
///
/// Validation exhaustion, plan failure and cancellation are not errors; they
/// are reported through `SynthesisOutcome`.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Malformed request (component name, examples, schema)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Threshold or preset problem
    #[error("Pattern filter error: {0}")]
    Filter(#[from] FilterError),

    /// Project directory already exists and overwriting is disabled
    #[error("Project directory already exists: {}", .0.display())]
    ProjectExists(PathBuf),

    /// State machine received an event it does not accept in this state
    #[error("Invalid transition from {from:?} on {event:?}")]
    InvalidTransition {
        from: SynthesisState,
        event: SynthesisEvent,
    },

    /// A resource failure stopped the run after best-effort rollback
    #[error("Synthesis aborted after {} attempt(s): {source}", .report.attempts)]
    Aborted {
        report: Box<SynthesisReport>,
        #[source]
        source: ResourceError,
    },
}

impl SynthesisError {
    /// Run report, when the error happened inside a run
    pub fn report(&self) -> Option<&SynthesisReport> {
        match self {
            SynthesisError::Aborted { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SynthesisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_exists_message() {
        let error = SynthesisError::ProjectExists(PathBuf::from("/tmp/person"));
        assert!(error.to_string().contains("already exists"));
        assert!(error.to_string().contains("/tmp/person"));
        assert!(error.report().is_none());
    }

    #[test]
    fn test_filter_error_conversion() {
        let error: SynthesisError = FilterError::InvalidThreshold(1.5).into();
        assert!(error.to_string().contains("1.5"));
    }

    #[test]
    fn test_io_resource_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ResourceError::io("/x/extractor.yaml", io);
        assert!(error.to_string().contains("/x/extractor.yaml"));
        assert!(error.to_string().contains("denied"));
    }
}
