//! Run reports and outcomes

use crate::state::SynthesisState;
use exforge_llm::SynthesisPlan;
use exforge_registry::RegistrationOutcome;
use exforge_validator::ValidationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Why a run ended without a committed extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The planning call failed or returned an unusable plan
    PlanFailed,
    /// Every implementation attempt was used up
    AttemptsExhausted,
    /// The caller cancelled the run
    Cancelled,
    /// Writing files or registering failed
    ResourceFailure,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::PlanFailed => "planning failed",
            FailureReason::AttemptsExhausted => "implementation attempts exhausted",
            FailureReason::Cancelled => "cancelled",
            FailureReason::ResourceFailure => "resource failure",
        };
        write!(f, "{}", text)
    }
}

/// Summary of one orchestrator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub run_id: String,
    pub component: String,
    pub final_state: SynthesisState,
    pub history: Vec<SynthesisState>,
    pub attempts: u32,
    pub elapsed_ms: u64,
    pub errors: Vec<String>,
    pub failure: Option<FailureReason>,

    /// Violation report of the last validated candidate
    pub last_violations: Option<String>,

    /// Share of examples reproduced exactly on the schema fields
    pub example_accuracy: Option<f64>,

    /// True when no file was written
    pub dry_run: bool,
}

impl SynthesisReport {
    pub fn succeeded(&self) -> bool {
        self.final_state == SynthesisState::Success
    }
}

impl fmt::Display for SynthesisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [{}]: {} after {} attempt(s) in {} ms",
            self.component, self.run_id, self.final_state, self.attempts, self.elapsed_ms
        )?;
        if let Some(reason) = self.failure {
            writeln!(f, "Reason: {}", reason)?;
        }
        for error in &self.errors {
            writeln!(f, "Error: {}", error)?;
        }
        if let Some(accuracy) = self.example_accuracy {
            writeln!(f, "Example accuracy: {:.0}%", accuracy * 100.0)?;
        }
        if let Some(violations) = &self.last_violations {
            writeln!(f, "Last violations:")?;
            write!(f, "{}", violations)?;
        }
        Ok(())
    }
}

/// Result of a synthesis run that did not hit a resource error
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub report: SynthesisReport,

    /// Final candidate source, also present on failure when one was produced
    pub source: Option<String>,

    pub plan: Option<SynthesisPlan>,
    pub validation: Option<ValidationResult>,

    /// Directory holding the committed files
    pub project_dir: Option<PathBuf>,

    pub registration: Option<RegistrationOutcome>,
}

impl SynthesisOutcome {
    pub fn is_success(&self) -> bool {
        self.report.succeeded()
    }
}
