//! Synthesis orchestrator
//!
//! Drives one run through plan, implement and validate, retrying with the
//! previous attempt's violations until the attempt budget is spent, then
//! commits the project or rolls it back.

use crate::context::{CancellationToken, GenerationContext};
use crate::error::{ResourceError, Result, SynthesisError};
use crate::project::{
    ProjectFiles, ProjectWriter, EXAMPLES_FILE, EXTRACTOR_FILE, MANIFEST_FILE, PLAN_FILE,
    SCHEMA_FILE,
};
use crate::report::{FailureReason, SynthesisOutcome};
use crate::state::{SynthesisEvent, SynthesisState};
use chrono::{DateTime, Utc};
use exforge_core::types::record;
use exforge_core::{Example, Extractor};
use exforge_llm::{ExtractorGenerator, SynthesisPlan, SynthesisSpec};
use exforge_registry::{ExtractorRegistry, RegistrationOutcome, RegistryEntry, Version};
use exforge_runtime::DslExtractor;
use exforge_validator::ConstraintEnforcer;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

/// Where and whether a run writes its result
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Project directory; nothing is written when unset
    pub project_dir: Option<PathBuf>,

    /// Run the full state machine without touching the filesystem
    pub dry_run: bool,

    pub overwrite_existing: bool,

    /// Register the committed extractor under this version and tags
    pub register: Option<(Version, Vec<String>)>,
}

impl OutputOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    pub fn write_to(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: Some(project_dir.into()),
            ..Default::default()
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn register_as<I, S>(mut self, version: Version, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register = Some((version, tags.into_iter().map(Into::into).collect()));
        self
    }

    fn writes_files(&self) -> bool {
        !self.dry_run && self.project_dir.is_some()
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    name: &'a str,
    run_id: &'a str,
    created_at: DateTime<Utc>,
    model: &'a str,
    attempts: u32,
    confidence: f64,
    pattern_count: usize,
    example_count: usize,
    example_accuracy: Option<f64>,
    files: Vec<&'a str>,
}

/// Runs the plan / implement / validate loop
pub struct SynthesisOrchestrator {
    generator: ExtractorGenerator,
    enforcer: Arc<ConstraintEnforcer>,
    registry: Option<Arc<ExtractorRegistry>>,
    max_retries: u32,
}

impl SynthesisOrchestrator {
    /// `max_retries` is the total number of implementation attempts
    pub fn new(
        generator: ExtractorGenerator,
        enforcer: Arc<ConstraintEnforcer>,
        max_retries: u32,
    ) -> Result<Self> {
        if max_retries == 0 {
            return Err(SynthesisError::ConfigError(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            generator,
            enforcer,
            registry: None,
            max_retries,
        })
    }

    pub fn with_registry(mut self, registry: Arc<ExtractorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run one synthesis
    ///
    /// Plan failure, exhausted attempts and cancellation return `Ok` with a
    /// failed outcome. Filesystem or registry failures roll back and return
    /// `SynthesisError::Aborted`.
    pub async fn run(
        &self,
        spec: &SynthesisSpec,
        examples: &[Example],
        output: &OutputOptions,
        cancel: &CancellationToken,
    ) -> Result<SynthesisOutcome> {
        let mut writer = match (&output.project_dir, output.writes_files()) {
            (Some(dir), true) => Some(ProjectWriter::prepare(dir, output.overwrite_existing)?),
            _ => None,
        };

        let mut ctx = GenerationContext::new(
            spec.component_name.clone(),
            &spec.patterns,
            &spec.schema,
            self.max_retries,
        );
        let span = tracing::info_span!(
            "synthesis.run",
            run_id = %ctx.run_id,
            component = %spec.component_name
        );

        async {
            tracing::info!(
                patterns = spec.patterns.len(),
                examples = examples.len(),
                max_retries = self.max_retries,
                dry_run = output.dry_run,
                "synthesis started"
            );
            let result = self
                .drive(spec, examples, output, cancel, &mut ctx, writer.as_mut())
                .await;
            self.settle(&mut ctx, writer.as_mut(), result).await
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        spec: &SynthesisSpec,
        examples: &[Example],
        output: &OutputOptions,
        cancel: &CancellationToken,
        ctx: &mut GenerationContext<'_>,
        mut writer: Option<&mut ProjectWriter>,
    ) -> Result<SynthesisOutcome> {
        if cancel.is_cancelled() {
            return self.cancelled(ctx, writer, output, None, None).await;
        }

        let plan = match self.generator.plan(spec).await {
            Ok(plan) => plan,
            Err(e) => {
                ctx.record_error(format!("planning failed: {}", e));
                ctx.advance(SynthesisEvent::PlanFailed)?;
                return self
                    .rolled_back(ctx, writer, output, FailureReason::PlanFailed, None, None)
                    .await;
            }
        };
        ctx.advance(SynthesisEvent::PlanReady)?;

        let mut candidate: Option<String> = None;
        loop {
            if cancel.is_cancelled() {
                return self.cancelled(ctx, writer, output, Some(plan), candidate).await;
            }

            let attempt = ctx.begin_attempt();
            let feedback = ctx.feedback.take();
            let implemented = self
                .generator
                .implement(spec, &plan, feedback.as_deref().map(|f| (attempt - 1, f)))
                .await;

            let source = match implemented {
                Ok(source) => source,
                Err(e) => {
                    let message = format!("attempt {}: implementation failed: {}", attempt, e);
                    ctx.record_error(message.clone());
                    ctx.feedback = Some(message);
                    match ctx.advance(SynthesisEvent::ImplementationFailed)? {
                        SynthesisState::Retrying => {
                            ctx.advance(SynthesisEvent::Retry)?;
                            continue;
                        }
                        _ => {
                            return self
                                .rolled_back(
                                    ctx,
                                    writer,
                                    output,
                                    FailureReason::AttemptsExhausted,
                                    Some(plan),
                                    candidate,
                                )
                                .await
                        }
                    }
                }
            };

            if let Some(w) = writer.as_deref_mut() {
                if let Err(e) = w.write_draft(&source).await {
                    return self.abort(ctx, writer, output, e).await;
                }
            }
            candidate = Some(source);
            ctx.advance(SynthesisEvent::CandidateReady)?;

            let source = candidate.as_deref().unwrap_or_default();
            let result = self.enforcer.validate_code(source);
            tracing::info!(
                attempt,
                errors = result.error_count,
                warnings = result.warning_count,
                "candidate validated"
            );
            let passed = result.valid;
            if !passed {
                ctx.feedback = Some(result.report());
            }
            ctx.last_validation = Some(result);

            // last point before commit and registration
            if cancel.is_cancelled() {
                return self.cancelled(ctx, writer, output, Some(plan), candidate).await;
            }

            if passed {
                ctx.advance(SynthesisEvent::ValidationPassed)?;
                break;
            }
            match ctx.advance(SynthesisEvent::ValidationFailed)? {
                SynthesisState::Retrying => {
                    ctx.advance(SynthesisEvent::Retry)?;
                }
                _ => {
                    return self
                        .rolled_back(
                            ctx,
                            writer,
                            output,
                            FailureReason::AttemptsExhausted,
                            Some(plan),
                            candidate,
                        )
                        .await
                }
            }
        }

        let source = candidate.unwrap_or_default();
        let accuracy = example_accuracy(&source, examples, spec);
        if let Some(accuracy) = accuracy {
            tracing::info!(accuracy, "candidate replayed against examples");
        }

        let mut project_dir = None;
        let mut registration = None;
        if let Some(w) = writer.as_deref_mut() {
            let files = match self.project_files(ctx, spec, &plan, &source, examples, accuracy) {
                Ok(files) => files,
                Err(e) => return self.abort(ctx, writer, output, e).await,
            };
            if let Err(e) = w.commit(&files).await {
                return self.abort(ctx, writer, output, e).await;
            }
            project_dir = Some(w.root().to_path_buf());
            let extractor_path = w.path_of(EXTRACTOR_FILE);
            let extractor_path = match tokio::fs::canonicalize(&extractor_path).await {
                Ok(path) => path,
                Err(e) => {
                    let error = ResourceError::io(extractor_path, e);
                    return self.abort(ctx, writer, output, error).await;
                }
            };

            if let (Some(registry), Some((version, tags))) = (&self.registry, &output.register) {
                let entry = RegistryEntry::new(
                    spec.component_name.clone(),
                    version.clone(),
                    extractor_path.to_string_lossy().into_owned(),
                )
                .with_confidence(ctx.mean_confidence())
                .with_example_count(examples.len())
                .with_tags(tags.iter().cloned());

                match registry.register(entry).await {
                    Ok(outcome) => registration = Some(outcome),
                    Err(e) => return self.abort(ctx, writer, output, e.into()).await,
                }
            }
        }

        let report = ctx.report(None, accuracy, !output.writes_files());
        tracing::info!(
            attempts = report.attempts,
            elapsed_ms = report.elapsed_ms,
            registered = registration.is_some(),
            "synthesis succeeded"
        );
        if let Some(RegistrationOutcome::Updated { previous }) = &registration {
            tracing::info!(version = %previous.version, "replaced existing registry entry");
        }
        Ok(SynthesisOutcome {
            report,
            source: Some(source),
            plan: Some(plan),
            validation: ctx.last_validation.clone(),
            project_dir,
            registration,
        })
    }

    fn project_files(
        &self,
        ctx: &GenerationContext<'_>,
        spec: &SynthesisSpec,
        plan: &SynthesisPlan,
        source: &str,
        examples: &[Example],
        accuracy: Option<f64>,
    ) -> std::result::Result<ProjectFiles, ResourceError> {
        let schema = serde_yaml::to_string(&spec.schema)
            .map_err(|e| ResourceError::Serialization(e.to_string()))?;
        let examples_json = serde_json::to_string_pretty(examples)
            .map_err(|e| ResourceError::Serialization(e.to_string()))?;

        let files = [EXTRACTOR_FILE, SCHEMA_FILE, PLAN_FILE, EXAMPLES_FILE, MANIFEST_FILE];
        let manifest = Manifest {
            name: &spec.component_name,
            run_id: &ctx.run_id,
            created_at: Utc::now(),
            model: &self.generator.config().model,
            attempts: ctx.attempts,
            confidence: ctx.mean_confidence(),
            pattern_count: spec.patterns.len(),
            example_count: examples.len(),
            example_accuracy: accuracy,
            files: files.to_vec(),
        };
        let manifest = serde_yaml::to_string(&manifest)
            .map_err(|e| ResourceError::Serialization(e.to_string()))?;

        Ok(ProjectFiles::new()
            .with_file(EXTRACTOR_FILE, source)
            .with_file(SCHEMA_FILE, schema)
            .with_file(PLAN_FILE, plan.to_yaml())
            .with_file(EXAMPLES_FILE, examples_json)
            .with_file(MANIFEST_FILE, manifest))
    }

    /// Roll back after a state machine error that left `drive` early
    async fn settle(
        &self,
        ctx: &mut GenerationContext<'_>,
        writer: Option<&mut ProjectWriter>,
        result: Result<SynthesisOutcome>,
    ) -> Result<SynthesisOutcome> {
        if let Err(error @ SynthesisError::InvalidTransition { .. }) = &result {
            ctx.record_error(error.to_string());
            self.cleanup(ctx, writer).await;
            tracing::error!(error = %error, "synthesis stopped on an invalid transition");
        }
        result
    }

    async fn cleanup(&self, ctx: &mut GenerationContext<'_>, writer: Option<&mut ProjectWriter>) {
        if let Some(w) = writer {
            if let Err(e) = w.rollback().await {
                ctx.record_error(format!("rollback incomplete: {}", e));
            }
        }
    }

    async fn rolled_back(
        &self,
        ctx: &mut GenerationContext<'_>,
        writer: Option<&mut ProjectWriter>,
        output: &OutputOptions,
        reason: FailureReason,
        plan: Option<SynthesisPlan>,
        source: Option<String>,
    ) -> Result<SynthesisOutcome> {
        self.cleanup(ctx, writer).await;
        let report = ctx.report(Some(reason), None, !output.writes_files());
        tracing::warn!(
            reason = %reason,
            attempts = report.attempts,
            elapsed_ms = report.elapsed_ms,
            "synthesis rolled back"
        );
        Ok(SynthesisOutcome {
            report,
            source,
            plan,
            validation: ctx.last_validation.clone(),
            project_dir: None,
            registration: None,
        })
    }

    async fn cancelled(
        &self,
        ctx: &mut GenerationContext<'_>,
        writer: Option<&mut ProjectWriter>,
        output: &OutputOptions,
        plan: Option<SynthesisPlan>,
        source: Option<String>,
    ) -> Result<SynthesisOutcome> {
        ctx.record_error("cancelled by caller");
        ctx.advance(SynthesisEvent::Cancelled)?;
        self.rolled_back(ctx, writer, output, FailureReason::Cancelled, plan, source)
            .await
    }

    async fn abort(
        &self,
        ctx: &mut GenerationContext<'_>,
        writer: Option<&mut ProjectWriter>,
        output: &OutputOptions,
        error: ResourceError,
    ) -> Result<SynthesisOutcome> {
        ctx.record_error(error.to_string());
        ctx.advance(SynthesisEvent::ResourceFailure)?;
        self.cleanup(ctx, writer).await;
        let report = ctx.report(
            Some(FailureReason::ResourceFailure),
            None,
            !output.writes_files(),
        );
        tracing::error!(error = %error, "synthesis aborted");
        Err(SynthesisError::Aborted {
            report: Box::new(report),
            source: error,
        })
    }
}

/// Share of examples whose schema fields the candidate reproduces exactly
fn example_accuracy(source: &str, examples: &[Example], spec: &SynthesisSpec) -> Option<f64> {
    if examples.is_empty() || spec.schema.fields.is_empty() {
        return None;
    }
    let extractor = match DslExtractor::from_source(source) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::warn!(error = %e, "validated candidate could not be compiled");
            return None;
        }
    };

    let matched = examples
        .iter()
        .filter(|example| match extractor.extract(example.input()) {
            Ok(actual) => spec.schema.fields.iter().all(|field| {
                record::get_path(&actual, &field.path) == record::get_path(example.output(), &field.path)
            }),
            Err(_) => false,
        })
        .count();
    Some(matched as f64 / examples.len() as f64)
}
