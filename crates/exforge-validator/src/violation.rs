//! Violations and aggregated validation results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Where a violation was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-based, if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Column number (1-based, if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    /// Operation name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Step path inside the operation (e.g. `steps[2].then[0]`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(op) = &self.operation {
            parts.push(format!("operation {}", op));
        }
        if let Some(step) = &self.step {
            parts.push(step.clone());
        }
        match (self.line, self.column) {
            (Some(l), Some(c)) => parts.push(format!("line {}:{}", l, c)),
            (Some(l), None) => parts.push(format!("line {}", l)),
            _ => {}
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Violation {
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location: None,
        }
    }

    pub fn error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Error, message)
    }

    pub fn warning(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Warning, message)
    }

    /// Attach a line/column position
    pub fn at_position(mut self, line: Option<usize>, column: Option<usize>) -> Self {
        let loc = self.location.get_or_insert_with(Location::default);
        loc.line = line;
        loc.column = column;
        self
    }

    /// Attach an operation and optional step path
    pub fn in_operation(mut self, operation: impl Into<String>, step: Option<String>) -> Self {
        let loc = self.location.get_or_insert_with(Location::default);
        loc.operation = Some(operation.into());
        loc.step = step;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.rule_id, self.message)?;
        if let Some(loc) = &self.location {
            let text = loc.to_string();
            if !text.is_empty() {
                write!(f, " ({})", text)?;
            }
        }
        Ok(())
    }
}

/// Result of validating one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the candidate has no error-severity violations
    pub valid: bool,

    pub violations: Vec<Violation>,

    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,

    /// Extractor name, when the source parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor_name: Option<String>,

    /// Validation time in milliseconds
    pub validation_time_ms: u64,
}

impl ValidationResult {
    /// Aggregate violations; counts and validity are derived
    pub fn from_violations(
        violations: Vec<Violation>,
        extractor_name: Option<String>,
        validation_time_ms: u64,
    ) -> Self {
        let count = |s: Severity| violations.iter().filter(|v| v.severity == s).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);
        Self {
            valid: error_count == 0,
            violations,
            error_count,
            warning_count,
            info_count,
            extractor_name,
            validation_time_ms,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.violations.iter().any(|v| v.rule_id == rule_id)
    }

    /// Plain-text report, one violation per line, errors first
    pub fn report(&self) -> String {
        let mut lines: Vec<String> = self.errors().map(|v| format!("- {}", v)).collect();
        lines.extend(
            self.violations
                .iter()
                .filter(|v| v.severity != Severity::Error)
                .map(|v| format!("- {}", v)),
        );
        if lines.is_empty() {
            return "no violations".to_string();
        }
        lines.join("\n")
    }
}
