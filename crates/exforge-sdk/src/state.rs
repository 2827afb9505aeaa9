//! Synthesis state machine
//!
//! `transition` is the single definition of legal moves. The orchestrator
//! only ever changes state through it.

use crate::error::{Result, SynthesisError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisState {
    Planning,
    Implementing,
    Validating,
    Retrying,
    Success,
    RolledBack,
}

impl SynthesisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SynthesisState::Success | SynthesisState::RolledBack)
    }
}

impl fmt::Display for SynthesisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthesisState::Planning => "planning",
            SynthesisState::Implementing => "implementing",
            SynthesisState::Validating => "validating",
            SynthesisState::Retrying => "retrying",
            SynthesisState::Success => "success",
            SynthesisState::RolledBack => "rolled_back",
        };
        write!(f, "{}", name)
    }
}

/// Things that happen during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisEvent {
    PlanReady,
    PlanFailed,
    CandidateReady,
    ImplementationFailed,
    ValidationPassed,
    ValidationFailed,
    Retry,
    Cancelled,
    ResourceFailure,
}

/// Next state for `event` in `state`
///
/// `attempts` is the number of implementation attempts made so far and
/// `max_retries` the total number allowed; a failed attempt retries only
/// while `attempts < max_retries`. `Success` still accepts
/// `ResourceFailure`, since committing files happens after validation passed.
pub fn transition(
    state: SynthesisState,
    event: SynthesisEvent,
    attempts: u32,
    max_retries: u32,
) -> Result<SynthesisState> {
    use SynthesisEvent as E;
    use SynthesisState as S;

    let retry_or_rollback = if attempts < max_retries {
        S::Retrying
    } else {
        S::RolledBack
    };

    let next = match (state, event) {
        (S::Success, E::ResourceFailure) => S::RolledBack,
        (s, _) if s.is_terminal() => return Err(invalid(state, event)),

        (_, E::Cancelled) | (_, E::ResourceFailure) => S::RolledBack,

        (S::Planning, E::PlanReady) => S::Implementing,
        (S::Planning, E::PlanFailed) => S::RolledBack,

        (S::Implementing, E::CandidateReady) => S::Validating,
        (S::Implementing, E::ImplementationFailed) => retry_or_rollback,

        (S::Validating, E::ValidationPassed) => S::Success,
        (S::Validating, E::ValidationFailed) => retry_or_rollback,

        (S::Retrying, E::Retry) => S::Implementing,

        _ => return Err(invalid(state, event)),
    };
    Ok(next)
}

fn invalid(from: SynthesisState, event: SynthesisEvent) -> SynthesisError {
    SynthesisError::InvalidTransition { from, event }
}
