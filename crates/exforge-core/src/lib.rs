//! Exforge Core - Core types and definitions for the exforge extractor synthesizer
//!
//! This crate provides the fundamental types used across the exforge workspace:
//! - Example records and field-path helpers
//! - Inferred transformation patterns
//! - Target schemas and field types
//! - AST definitions for the extractor DSL
//! - The `Extractor` capability contract
//! - Error types

pub mod ast;
pub mod error;
pub mod extractor;
pub mod functions;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use extractor::Extractor;
pub use types::{
    Example, FieldType, Pattern, PatternType, Record, SchemaField, TargetSchema, Transformation,
};
