//! Exforge LLM Integration
//!
//! Boundary to the generative model used as a code producer:
//! - `LLMClient` trait with request/response types and providers
//! - `PromptGenerator`: deterministic synthesis specification from patterns and schema
//! - `ExtractorGenerator`: plan and implementation calls built on the specification
//! - YAML extraction from free-form model output

pub use client::{LLMClient, LLMRequest, LLMResponse};
pub use error::{LLMError, Result};

pub use provider::{AnthropicProvider, LLMProvider, MockProvider, OpenAIProvider};

pub use generator::{
    extract_yaml, locate_yaml, ExtractorGenerator, GeneratorConfig, PlannedField,
    PromptConstraints, PromptGenerator, SynthesisPlan, SynthesisSpec,
};

pub mod client;
pub mod error;
pub mod generator;
pub mod provider;
