//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// YAML syntax error, with a 1-based position when known
    #[error("YAML parsing error: {message}")]
    YamlError {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Malformed field path
    #[error("Invalid field path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// Unknown step or condition keyword
    #[error("Unknown keyword '{keyword}' at {field}")]
    UnknownKeyword { field: String, keyword: String },
}

impl ParseError {
    /// Source position, when the error came from the YAML layer
    pub fn position(&self) -> (Option<usize>, Option<usize>) {
        match self {
            ParseError::YamlError { line, column, .. } => (*line, *column),
            _ => (None, None),
        }
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        ParseError::YamlError {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_carries_position() {
        let err: ParseError = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2\nb: 3")
            .unwrap_err()
            .into();
        let (line, _column) = err.position();
        assert!(line.is_some());
        assert!(err.to_string().starts_with("YAML parsing error"));
    }

    #[test]
    fn test_semantic_error_has_no_position() {
        let err = ParseError::MissingField {
            field: "extractor.name".to_string(),
        };
        assert_eq!(err.position(), (None, None));
        assert_eq!(err.to_string(), "Missing required field: extractor.name");
    }
}
