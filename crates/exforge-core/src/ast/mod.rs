//! Extractor language AST
//!
//! Synthesized components are written in a small YAML language. A document
//! carries metadata (name, version, declared imports) and a list of
//! operations; the public `extract` operation is the entry point.

pub mod document;
pub mod step;

pub use document::{ExtractorDocument, ExtractorMetadata, Operation, Param, Visibility};
pub use step::{Condition, Step, ValueExpr};

/// Name of the entry operation every extractor must expose
pub const ENTRY_OPERATION: &str = "extract";

/// Type name used for record parameters and return values
pub const RECORD_TYPE: &str = "record";
