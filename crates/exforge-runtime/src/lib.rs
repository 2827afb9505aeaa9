//! Exforge Runtime - Execution engine for extractor documents
//!
//! Turns a parsed `ExtractorDocument` into a callable `Extractor`. Documents
//! are interpreted directly over JSON records; there is no separate compile
//! target.

pub mod builtins;
pub mod context;
pub mod error;
pub mod executor;

pub use context::Frame;
pub use error::{Result, RuntimeError};
pub use executor::{DslExtractor, MAX_CALL_DEPTH};
