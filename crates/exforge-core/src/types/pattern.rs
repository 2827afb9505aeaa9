//! Inferred mapping patterns

use crate::types::coerce;
use crate::types::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship a pattern describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    FieldMapping,
    NestedPath,
    TypeCoercion,
    StringTransform,
    Concatenation,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternType::FieldMapping => "field_mapping",
            PatternType::NestedPath => "nested_path",
            PatternType::TypeCoercion => "type_coercion",
            PatternType::StringTransform => "string_transform",
            PatternType::Concatenation => "concatenation",
        };
        write!(f, "{}", s)
    }
}

/// Value transformation applied between source and target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformation {
    Identity,
    Trim,
    Lowercase,
    Uppercase,
    ToInteger,
    ToFloat,
    ToString,
    ToBoolean,
    Concatenate { separator: String },
}

impl Transformation {
    /// Single-value transformations in detection priority order
    pub const SCALAR_PRIORITY: [Transformation; 8] = [
        Transformation::Identity,
        Transformation::Trim,
        Transformation::Lowercase,
        Transformation::Uppercase,
        Transformation::ToInteger,
        Transformation::ToFloat,
        Transformation::ToString,
        Transformation::ToBoolean,
    ];

    /// Apply a single-value transformation
    ///
    /// Returns `None` when the transformation does not apply to the value.
    /// `Concatenate` needs several values; see [`Transformation::apply_many`].
    pub fn apply(&self, value: &Record) -> Option<Record> {
        match self {
            Transformation::Identity => Some(value.clone()),
            Transformation::Trim => coerce::trim(value),
            Transformation::Lowercase => coerce::lowercase(value),
            Transformation::Uppercase => coerce::uppercase(value),
            Transformation::ToInteger => coerce::to_integer(value),
            Transformation::ToFloat => coerce::to_float(value),
            Transformation::ToString => coerce::to_string(value),
            Transformation::ToBoolean => coerce::to_boolean(value),
            Transformation::Concatenate { .. } => None,
        }
    }

    /// Apply a transformation to several source values
    pub fn apply_many(&self, values: &[&Record]) -> Option<Record> {
        match self {
            Transformation::Concatenate { separator } => {
                let parts: Option<Vec<&str>> = values.iter().map(|v| v.as_str()).collect();
                parts.map(|p| Record::String(p.join(separator)))
            }
            other => match values {
                [single] => other.apply(single),
                _ => None,
            },
        }
    }

    /// Built-in function that implements this transformation in the extractor language
    pub fn dsl_function(&self) -> Option<&'static str> {
        match self {
            Transformation::Identity => None,
            Transformation::Trim => Some("text.trim"),
            Transformation::Lowercase => Some("text.lower"),
            Transformation::Uppercase => Some("text.upper"),
            Transformation::ToInteger => Some("coerce.to_integer"),
            Transformation::ToFloat => Some("coerce.to_float"),
            Transformation::ToString => Some("coerce.to_string"),
            Transformation::ToBoolean => Some("coerce.to_boolean"),
            Transformation::Concatenate { .. } => Some("text.join"),
        }
    }

    pub fn is_coercion(&self) -> bool {
        matches!(
            self,
            Transformation::ToInteger
                | Transformation::ToFloat
                | Transformation::ToString
                | Transformation::ToBoolean
        )
    }

    pub fn is_string_transform(&self) -> bool {
        matches!(
            self,
            Transformation::Trim | Transformation::Lowercase | Transformation::Uppercase
        )
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::Identity => write!(f, "identity"),
            Transformation::Trim => write!(f, "trim"),
            Transformation::Lowercase => write!(f, "lowercase"),
            Transformation::Uppercase => write!(f, "uppercase"),
            Transformation::ToInteger => write!(f, "to_integer"),
            Transformation::ToFloat => write!(f, "to_float"),
            Transformation::ToString => write!(f, "to_string"),
            Transformation::ToBoolean => write!(f, "to_boolean"),
            Transformation::Concatenate { separator } => {
                write!(f, "concatenate({:?})", separator)
            }
        }
    }
}

/// An inferred relationship between a source path and a target path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_type: PatternType,
    pub confidence: f64,
    pub source_path: String,
    pub target_path: String,
    pub transformation: Transformation,
    #[serde(default)]
    pub examples: Vec<(Record, Record)>,
}

impl Pattern {
    /// Create a pattern; confidence is clamped into `[0, 1]` and NaN becomes 0
    pub fn new(
        pattern_type: PatternType,
        confidence: f64,
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        transformation: Transformation,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            pattern_type,
            confidence,
            source_path: source_path.into(),
            target_path: target_path.into(),
            transformation,
            examples: Vec::new(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<(Record, Record)>) -> Self {
        self.examples = examples;
        self
    }

    /// Source paths; concatenations join several with `+`
    pub fn source_paths(&self) -> Vec<&str> {
        self.source_path.split('+').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_confidence_clamped() {
        let p = Pattern::new(
            PatternType::FieldMapping,
            1.5,
            "a",
            "b",
            Transformation::Identity,
        );
        assert_eq!(p.confidence, 1.0);

        let p = Pattern::new(
            PatternType::FieldMapping,
            f64::NAN,
            "a",
            "b",
            Transformation::Identity,
        );
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn test_apply_many_concatenate() {
        let t = Transformation::Concatenate {
            separator: " ".to_string(),
        };
        let first = json!("Ada");
        let last = json!("Lovelace");
        assert_eq!(t.apply_many(&[&first, &last]), Some(json!("Ada Lovelace")));
        assert_eq!(t.apply(&first), None);
    }

    #[test]
    fn test_transformation_serde() {
        let yaml = serde_json::to_string(&Transformation::ToInteger).unwrap();
        assert_eq!(yaml, r#"{"kind":"to_integer"}"#);
        assert_eq!(PatternType::NestedPath.to_string(), "nested_path");
    }

    #[test]
    fn test_source_paths() {
        let p = Pattern::new(
            PatternType::Concatenation,
            1.0,
            "first+last",
            "full",
            Transformation::Concatenate {
                separator: " ".into(),
            },
        );
        assert_eq!(p.source_paths(), vec!["first", "last"]);
    }
}
