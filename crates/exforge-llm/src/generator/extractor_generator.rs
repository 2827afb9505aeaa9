//! Model-backed plan and implementation calls

use crate::client::{LLMClient, LLMRequest};
use crate::error::{LLMError, Result};
use crate::generator::prompt::{SynthesisPlan, SynthesisSpec};
use crate::generator::templates::SYSTEM_MESSAGE;
use crate::generator::yaml_extractor::{extract_yaml, locate_yaml};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for model calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model to use for generation
    pub model: String,
    /// Maximum tokens for response
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 1.0, lower = more deterministic)
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }
}

impl GeneratorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Issues the planning and implementation calls of a synthesis run
pub struct ExtractorGenerator {
    client: Arc<dyn LLMClient>,
    config: GeneratorConfig,
}

impl ExtractorGenerator {
    pub fn new(client: Arc<dyn LLMClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Self {
        Self::new(client, GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn request(&self, prompt: String, stage: &str) -> LLMRequest {
        let mut request = LLMRequest::new(prompt, self.config.model.clone())
            .with_system(SYSTEM_MESSAGE)
            .with_stage(stage);
        request.max_tokens = self.config.max_tokens;
        request.temperature = self.config.temperature;
        request
    }

    /// Ask the model for a plan; the answer must parse as a plan document
    pub async fn plan(&self, spec: &SynthesisSpec) -> Result<SynthesisPlan> {
        let request = self.request(spec.plan_prompt(), "plan");
        let response = self.client.call(request).await?;
        tracing::debug!(
            client = self.client.name(),
            tokens = response.tokens_used,
            "plan response received"
        );

        let yaml = extract_yaml(&response.content)?;
        let plan = SynthesisPlan::from_yaml(&yaml)?;

        let missing = plan.missing_targets(&spec.schema);
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "plan does not cover every target field");
        }
        Ok(plan)
    }

    /// Ask the model for candidate extractor source
    ///
    /// The returned text is only located, not parsed; syntax problems are
    /// left to validation so they can be fed back on retry.
    pub async fn implement(
        &self,
        spec: &SynthesisSpec,
        plan: &SynthesisPlan,
        feedback: Option<(u32, &str)>,
    ) -> Result<String> {
        let request = self.request(spec.implementation_prompt(plan, feedback), "implement");
        let response = self.client.call(request).await?;
        tracing::debug!(
            client = self.client.name(),
            tokens = response.tokens_used,
            truncated = response.is_truncated(),
            "implementation response received"
        );

        locate_yaml(&response.content).ok_or_else(|| {
            LLMError::InvalidResponse("implementation response contains no YAML".to_string())
        })
    }
}
