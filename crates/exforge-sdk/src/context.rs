//! Per-run generation context and cancellation

use crate::error::Result;
use crate::report::{FailureReason, SynthesisReport};
use crate::state::{transition, SynthesisEvent, SynthesisState};
use exforge_core::{Pattern, TargetSchema};
use exforge_validator::ValidationResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag shared between a caller and a run
///
/// The orchestrator checks it at every state transition; a model call already
/// in flight is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Mutable state of exactly one orchestrator run
#[derive(Debug)]
pub struct GenerationContext<'a> {
    pub run_id: String,
    pub component: String,
    pub patterns: &'a [Pattern],
    pub schema: &'a TargetSchema,
    pub attempts: u32,
    pub errors: Vec<String>,
    pub last_validation: Option<ValidationResult>,

    /// Feedback for the next attempt: a violation report or a call error
    pub feedback: Option<String>,

    state: SynthesisState,
    history: Vec<SynthesisState>,
    max_retries: u32,
    started: Instant,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        component: impl Into<String>,
        patterns: &'a [Pattern],
        schema: &'a TargetSchema,
        max_retries: u32,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            component: component.into(),
            patterns,
            schema,
            attempts: 0,
            errors: Vec::new(),
            last_validation: None,
            feedback: None,
            state: SynthesisState::Planning,
            history: vec![SynthesisState::Planning],
            max_retries,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> SynthesisState {
        self.state
    }

    pub fn history(&self) -> &[SynthesisState] {
        &self.history
    }

    /// Apply `event` and record the new state
    pub fn advance(&mut self, event: SynthesisEvent) -> Result<SynthesisState> {
        let next = transition(self.state, event, self.attempts, self.max_retries)?;
        tracing::debug!(from = %self.state, to = %next, event = ?event, "state transition");
        self.state = next;
        self.history.push(next);
        Ok(next)
    }

    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, attempts = self.attempts, "synthesis error recorded");
        self.errors.push(message);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Mean confidence of the patterns this run was given
    pub fn mean_confidence(&self) -> f64 {
        if self.patterns.is_empty() {
            return 0.0;
        }
        self.patterns.iter().map(|p| p.confidence).sum::<f64>() / self.patterns.len() as f64
    }

    pub fn report(
        &self,
        failure: Option<FailureReason>,
        example_accuracy: Option<f64>,
        dry_run: bool,
    ) -> SynthesisReport {
        SynthesisReport {
            run_id: self.run_id.clone(),
            component: self.component.clone(),
            final_state: self.state,
            history: self.history.clone(),
            attempts: self.attempts,
            elapsed_ms: self.elapsed_ms(),
            errors: self.errors.clone(),
            failure,
            last_violations: self.last_validation.as_ref().map(ValidationResult::report),
            example_accuracy,
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exforge_core::{PatternType, Transformation};

    #[test]
    fn test_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_context_tracks_history() {
        let schema = TargetSchema::new("person");
        let mut ctx = GenerationContext::new("person", &[], &schema, 2);
        assert_eq!(ctx.state(), SynthesisState::Planning);

        ctx.advance(SynthesisEvent::PlanReady).unwrap();
        ctx.begin_attempt();
        ctx.advance(SynthesisEvent::CandidateReady).unwrap();
        ctx.advance(SynthesisEvent::ValidationFailed).unwrap();
        assert_eq!(ctx.state(), SynthesisState::Retrying);

        let report = ctx.report(Some(FailureReason::AttemptsExhausted), None, true);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.history.len(), 4);
        assert!(!report.succeeded());
    }

    #[test]
    fn test_run_ids_are_unique() {
        let schema = TargetSchema::new("person");
        let a = GenerationContext::new("person", &[], &schema, 1);
        let b = GenerationContext::new("person", &[], &schema, 1);
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_mean_confidence() {
        let schema = TargetSchema::new("person");
        let patterns = vec![
            Pattern::new(PatternType::FieldMapping, 1.0, "a", "a", Transformation::Identity),
            Pattern::new(PatternType::FieldMapping, 0.5, "b", "b", Transformation::Identity),
        ];
        let ctx = GenerationContext::new("person", &patterns, &schema, 1);
        assert!((ctx.mean_confidence() - 0.75).abs() < 1e-9);
    }
}
