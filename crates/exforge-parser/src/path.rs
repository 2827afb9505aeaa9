//! Field path parsing

use crate::error::{ParseError, Result};
use std::fmt;

/// A validated dotted field path such as `input.location.city`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path; every segment must be a non-empty identifier
    /// made of letters, digits, `_` or `-`
    pub fn parse(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(ParseError::InvalidPath {
                path: path.to_string(),
                message: "path is empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(ParseError::InvalidPath {
                    path: path.to_string(),
                    message: "empty segment".to_string(),
                });
            }
            if !segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ParseError::InvalidPath {
                    path: path.to_string(),
                    message: format!("invalid segment '{}'", segment),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(FieldPath { segments })
    }

    /// Whether `text` looks like a path at all (used to tell paths from literals)
    pub fn is_path_like(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
