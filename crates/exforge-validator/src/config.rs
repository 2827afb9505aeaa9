//! Enforcer configuration

use crate::error::{Result, ValidatorError};
use crate::violation::Severity;
use serde::{Deserialize, Serialize};

/// Settings for the constraint checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Modules that may not appear in `imports`
    pub forbidden_imports: Vec<String>,

    /// Functions that may not be called
    pub forbidden_functions: Vec<String>,

    /// Maximum block nesting per operation
    pub max_nesting_depth: usize,

    /// Maximum `if` steps per operation
    pub max_branches: usize,

    /// Severity for complexity violations
    pub complexity_severity: Severity,

    /// Run the documentation check
    pub require_documentation: bool,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            forbidden_imports: vec![
                "process".to_string(),
                "shell".to_string(),
                "net".to_string(),
                "fs".to_string(),
            ],
            forbidden_functions: vec![
                "process.exec".to_string(),
                "shell.run".to_string(),
                "fs.write".to_string(),
                "fs.delete".to_string(),
                "net.fetch".to_string(),
                "eval".to_string(),
            ],
            max_nesting_depth: 3,
            max_branches: 8,
            complexity_severity: Severity::Warning,
            require_documentation: true,
        }
    }
}

impl EnforcerConfig {
    /// Reject configurations the checks cannot apply meaningfully
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(ValidatorError::InvalidConfig(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.complexity_severity == Severity::Info {
            return Err(ValidatorError::InvalidConfig(
                "complexity_severity must be 'error' or 'warning'".to_string(),
            ));
        }
        for (list, name) in [
            (&self.forbidden_imports, "forbidden_imports"),
            (&self.forbidden_functions, "forbidden_functions"),
        ] {
            if list.iter().any(|s| s.trim().is_empty()) {
                return Err(ValidatorError::InvalidConfig(format!(
                    "{} contains an empty entry",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn with_complexity_severity(mut self, severity: Severity) -> Self {
        self.complexity_severity = severity;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_max_branches(mut self, branches: usize) -> Self {
        self.max_branches = branches;
        self
    }
}
