//! Configuration for synthesis runs
//!
//! Loaded from `.env`, an optional `config/exforge.{yaml,toml,json}` file and
//! `EXFORGE_*` environment variables (nested keys use `__`, e.g.
//! `EXFORGE_ORCHESTRATOR__MAX_RETRIES=5`).

use crate::error::{Result, SynthesisError};
use exforge_llm::{GeneratorConfig, PromptConstraints};
use exforge_patterns::{DetectorConfig, ThresholdPreset};
use exforge_validator::EnforcerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Total implementation attempts per run (at least 1)
    pub max_retries: u32,

    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,

    /// Allow writing into an existing project directory
    pub overwrite_existing: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            max_retries: 3,
            model: generator.model,
            temperature: generator.temperature,
            max_tokens: generator.max_tokens,
            overwrite_existing: false,
        }
    }
}

impl OrchestratorSettings {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Pattern detection and filtering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PatternSettings {
    pub preset: ThresholdPreset,

    /// Threshold for the `custom` preset
    pub threshold: Option<f64>,

    pub detector: DetectorConfig,
}

/// Registry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegistrySettings {
    /// Path of `registry.yaml`; no registry when unset
    pub path: Option<PathBuf>,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub orchestrator: OrchestratorSettings,
    pub patterns: PatternSettings,
    pub enforcer: EnforcerConfig,
    pub registry: RegistrySettings,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorSettings::default(),
            patterns: PatternSettings::default(),
            enforcer: EnforcerConfig::default(),
            registry: RegistrySettings::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl SynthesisConfig {
    /// Load configuration from `.env`, `config/exforge` and the environment
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/exforge").required(false))
            .add_source(config::Environment::with_prefix("EXFORGE").separator("__"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(_) => {
                tracing::info!("No config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from one file, ignoring the environment
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))
    }

    /// Reject values the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.orchestrator.max_retries == 0 {
            return Err(SynthesisError::ConfigError(
                "orchestrator.max_retries must be at least 1".to_string(),
            ));
        }
        self.patterns
            .preset
            .resolve(self.patterns.threshold)
            .map_err(SynthesisError::Filter)?;
        self.enforcer
            .validate()
            .map_err(|e| SynthesisError::ConfigError(e.to_string()))?;
        Ok(())
    }
}

/// Prompt constraints matching an enforcer configuration
pub fn prompt_constraints(enforcer: &EnforcerConfig) -> PromptConstraints {
    PromptConstraints {
        forbidden_imports: enforcer.forbidden_imports.clone(),
        forbidden_functions: enforcer.forbidden_functions.clone(),
        max_nesting_depth: enforcer.max_nesting_depth,
        max_branches: enforcer.max_branches,
        require_documentation: enforcer.require_documentation,
    }
}
