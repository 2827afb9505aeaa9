//! Synthesizer - the main entry point
//!
//! Wires pattern detection, filtering and prompt construction in front of the
//! orchestrator.

use crate::config::{prompt_constraints, RegistrySettings, SynthesisConfig};
use crate::context::CancellationToken;
use crate::error::{Result, SynthesisError};
use crate::orchestrator::{OutputOptions, SynthesisOrchestrator};
use crate::report::SynthesisOutcome;
use exforge_core::{Example, Pattern, TargetSchema};
use exforge_llm::{ExtractorGenerator, LLMClient, PromptGenerator, SynthesisSpec};
use exforge_patterns::{ConfidenceFilter, PatternDetector};
use exforge_registry::{
    ExtractorRegistry, ImplementationLoader, RegistryResult, YamlFileStore,
};
use exforge_validator::ConstraintEnforcer;
use std::path::Path;
use std::sync::Arc;

/// One synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub component_name: String,
    pub examples: Vec<Example>,
    pub schema: TargetSchema,
    pub output: OutputOptions,
}

impl SynthesisRequest {
    /// Create a dry-run request
    pub fn new(
        component_name: impl Into<String>,
        examples: Vec<Example>,
        schema: TargetSchema,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            examples,
            schema,
            output: OutputOptions::dry_run(),
        }
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Reject requests that cannot produce a component
    pub fn validate(&self) -> Result<()> {
        let name = self.component_name.trim();
        if name.is_empty() {
            return Err(SynthesisError::InvalidRequest(
                "component name is empty".to_string(),
            ));
        }
        if name.contains(['/', '\\']) {
            return Err(SynthesisError::InvalidRequest(format!(
                "component name '{}' contains a path separator",
                name
            )));
        }
        if self.examples.is_empty() {
            return Err(SynthesisError::InvalidRequest(
                "at least one example is required".to_string(),
            ));
        }
        if self.schema.fields.is_empty() {
            return Err(SynthesisError::InvalidRequest(format!(
                "target schema '{}' has no fields",
                self.schema.name
            )));
        }
        if self.output.register.is_some() && (self.output.dry_run || self.output.project_dir.is_none())
        {
            return Err(SynthesisError::InvalidRequest(
                "registration requires a project directory outside dry-run".to_string(),
            ));
        }
        Ok(())
    }
}

/// Synthesizes extractors from examples
pub struct Synthesizer {
    config: SynthesisConfig,
    detector: PatternDetector,
    orchestrator: SynthesisOrchestrator,
    has_registry: bool,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig, client: Arc<dyn LLMClient>) -> Result<Self> {
        config.validate()?;

        let enforcer = ConstraintEnforcer::new(config.enforcer.clone())
            .map_err(|e| SynthesisError::ConfigError(e.to_string()))?;
        let generator = ExtractorGenerator::new(client, config.orchestrator.generator_config());
        let orchestrator = SynthesisOrchestrator::new(
            generator,
            Arc::new(enforcer),
            config.orchestrator.max_retries,
        )?;

        Ok(Self {
            detector: PatternDetector::new(config.patterns.detector.clone()),
            config,
            orchestrator,
            has_registry: false,
        })
    }

    /// Register successful components in `registry`
    pub fn with_registry(mut self, registry: Arc<ExtractorRegistry>) -> Self {
        self.orchestrator = self.orchestrator.with_registry(registry);
        self.has_registry = true;
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn detect(&self, examples: &[Example]) -> Vec<Pattern> {
        self.detector.detect(examples)
    }

    /// Build the synthesis specification for `request` without calling the model
    pub fn specify(&self, request: &SynthesisRequest, patterns: &[Pattern]) -> Result<SynthesisSpec> {
        let filtered = ConfidenceFilter::filter_with_preset(
            patterns,
            self.config.patterns.preset,
            self.config.patterns.threshold,
        )?;
        tracing::info!(
            detected = patterns.len(),
            accepted = filtered.accepted().len(),
            threshold = filtered.threshold(),
            "patterns filtered"
        );
        tracing::debug!(summary = %ConfidenceFilter::summarize(&filtered), "pattern summary");
        if filtered.is_empty() {
            tracing::warn!("no pattern passed the threshold; relying on the schema alone");
        }

        Ok(PromptGenerator::generate(
            &request.component_name,
            filtered.accepted(),
            &request.schema,
            &prompt_constraints(&self.config.enforcer),
        ))
    }

    /// Detect, filter, and run the orchestrator for `request`
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<SynthesisOutcome> {
        request.validate()?;
        if request.output.register.is_some() && !self.has_registry {
            return Err(SynthesisError::InvalidRequest(
                "registration requested but no registry is configured".to_string(),
            ));
        }

        let patterns = self.detect(&request.examples);
        let spec = self.specify(request, &patterns)?;

        let mut output = request.output.clone();
        output.overwrite_existing |= self.config.orchestrator.overwrite_existing;

        self.orchestrator
            .run(&spec, &request.examples, &output, cancel)
            .await
    }
}

/// Open the registry named by `settings`, if any
///
/// Relative implementation paths resolve against the registry file's directory.
pub async fn open_registry(
    settings: &RegistrySettings,
) -> RegistryResult<Option<Arc<ExtractorRegistry>>> {
    let path = match &settings.path {
        Some(path) => path,
        None => return Ok(None),
    };

    let store = YamlFileStore::new(path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let registry = ExtractorRegistry::open(Arc::new(store), ImplementationLoader::new(base_dir)).await?;
    Ok(Some(Arc::new(registry)))
}
