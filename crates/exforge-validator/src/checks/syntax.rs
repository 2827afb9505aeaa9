//! Syntax check: the source must parse into an extractor document

use crate::checks::Check;
use crate::violation::Violation;
use exforge_core::ast::ExtractorDocument;
use exforge_parser::ExtractorParser;

pub const PARSE_ERROR: &str = "syntax.parse_error";

pub struct SyntaxCheck;

impl SyntaxCheck {
    /// Parse source, converting a failure into a positioned violation
    pub fn parse(source: &str) -> std::result::Result<ExtractorDocument, Violation> {
        ExtractorParser::parse(source).map_err(|e| {
            let (line, column) = e.position();
            let violation = Violation::error(PARSE_ERROR, e.to_string());
            if line.is_some() || column.is_some() {
                violation.at_position(line, column)
            } else {
                violation
            }
        })
    }
}

impl Check for SyntaxCheck {
    fn id(&self) -> &'static str {
        "syntax"
    }

    fn run(&self, source: &str, _document: Option<&ExtractorDocument>) -> Vec<Violation> {
        match Self::parse(source) {
            Ok(_) => Vec::new(),
            Err(v) => vec![v],
        }
    }
}
