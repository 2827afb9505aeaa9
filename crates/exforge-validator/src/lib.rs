//! Exforge Validator
//!
//! Static checks applied to candidate extractor source before it is accepted:
//! syntax, entry contract, complexity limits, documentation and forbidden
//! capabilities. Violations are data; only I/O and configuration problems are
//! errors.

pub mod checks;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod violation;

pub use checks::Check;
pub use config::EnforcerConfig;
pub use enforcer::ConstraintEnforcer;
pub use error::{Result, ValidatorError};
pub use violation::{Location, Severity, ValidationResult, Violation};
