//! Prompt generation and model-backed extractor generation

mod extractor_generator;
mod prompt;
pub mod templates;
mod yaml_extractor;

pub use extractor_generator::{ExtractorGenerator, GeneratorConfig};
pub use prompt::{PlannedField, PromptConstraints, PromptGenerator, SynthesisPlan, SynthesisSpec};
pub use yaml_extractor::{extract_yaml, locate_yaml};
