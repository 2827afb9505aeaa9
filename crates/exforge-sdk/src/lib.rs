//! Exforge SDK
//!
//! High-level API for synthesizing extractors from input/output examples.
//!
//! ```no_run
//! use exforge_core::{Example, FieldType, SchemaField, TargetSchema};
//! use exforge_llm::AnthropicProvider;
//! use exforge_sdk::{CancellationToken, OutputOptions, SynthesisConfig, SynthesisRequest, Synthesizer};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SynthesisConfig::load()?;
//! exforge_sdk::telemetry::init_tracing(&config.log_level, config.log_json)?;
//!
//! let client = Arc::new(AnthropicProvider::new(std::env::var("ANTHROPIC_API_KEY")?)?);
//! let synthesizer = Synthesizer::new(config, client)?;
//!
//! let examples = Example::load_json_file("examples.json")?;
//! let schema = TargetSchema::new("person").with_field(SchemaField::new("fullName", FieldType::String));
//! let request = SynthesisRequest::new("person_extractor", examples, schema)
//!     .with_output(OutputOptions::write_to("out/person_extractor"));
//!
//! let outcome = synthesizer.synthesize(&request, &CancellationToken::new()).await?;
//! println!("{}", outcome.report);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod project;
pub mod report;
pub mod state;
pub mod synthesizer;
pub mod telemetry;

// Re-export main types
pub use config::{OrchestratorSettings, PatternSettings, RegistrySettings, SynthesisConfig};
pub use context::{CancellationToken, GenerationContext};
pub use error::{ResourceError, Result, SynthesisError};
pub use orchestrator::{OutputOptions, SynthesisOrchestrator};
pub use report::{FailureReason, SynthesisOutcome, SynthesisReport};
pub use state::{transition, SynthesisEvent, SynthesisState};
pub use synthesizer::{open_registry, SynthesisRequest, Synthesizer};

// Re-export commonly used types from dependencies
pub use exforge_core::{Example, Extractor, TargetSchema};
pub use exforge_registry::{ExtractorRegistry, Version};
