//! Exforge Parser
//!
//! Parses extractor documents written in YAML into the AST defined in
//! `exforge-core`.

pub mod error;
pub mod extractor_parser;
pub mod path;
pub mod yaml_parser;

pub use error::{ParseError, Result};
pub use extractor_parser::ExtractorParser;
pub use path::FieldPath;
pub use yaml_parser::YamlParser;
