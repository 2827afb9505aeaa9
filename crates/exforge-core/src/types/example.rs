//! Input/output example pairs

use crate::error::{CoreError, Result};
use crate::types::record::Record;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single input record paired with the output record it should produce
///
/// Both sides must be JSON objects. The fields are private so a constructed
/// example cannot be mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    input: Record,
    output: Record,
}

#[derive(Deserialize)]
struct RawExample {
    input: Record,
    output: Record,
}

impl Example {
    /// Create a new example, rejecting non-object records
    pub fn new(input: Record, output: Record) -> Result<Self> {
        if !input.is_object() {
            return Err(CoreError::InvalidExample(format!(
                "input must be an object, got {}",
                kind_of(&input)
            )));
        }
        if !output.is_object() {
            return Err(CoreError::InvalidExample(format!(
                "output must be an object, got {}",
                kind_of(&output)
            )));
        }
        Ok(Self { input, output })
    }

    pub fn input(&self) -> &Record {
        &self.input
    }

    pub fn output(&self) -> &Record {
        &self.output
    }

    /// Parse a JSON array of `{ "input": {...}, "output": {...} }` objects
    pub fn parse_json_array(text: &str) -> Result<Vec<Example>> {
        let raw: Vec<RawExample> = serde_json::from_str(text)?;
        raw.into_iter()
            .enumerate()
            .map(|(idx, r)| {
                Example::new(r.input, r.output).map_err(|e| match e {
                    CoreError::InvalidExample(msg) => {
                        CoreError::InvalidExample(format!("example #{}: {}", idx, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }

    /// Load examples from a JSON file
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Vec<Example>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidExample(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_json_array(&text)
    }
}

impl<'de> Deserialize<'de> for Example {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawExample::deserialize(deserializer)?;
        Example::new(raw.input, raw.output).map_err(serde::de::Error::custom)
    }
}

fn kind_of(value: &Record) -> &'static str {
    match value {
        Record::Null => "null",
        Record::Bool(_) => "boolean",
        Record::Number(_) => "number",
        Record::String(_) => "string",
        Record::Array(_) => "array",
        Record::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        let err = Example::new(json!([1, 2]), json!({})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidExample(_)));
        assert!(err.to_string().contains("array"));

        assert!(Example::new(json!({}), json!("x")).is_err());
    }

    #[test]
    fn test_parse_json_array() {
        let text = r#"[
            {"input": {"name": "Ada"}, "output": {"fullName": "Ada"}},
            {"input": {"name": "Alan"}, "output": {"fullName": "Alan"}}
        ]"#;
        let examples = Example::parse_json_array(text).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].input()["name"], json!("Alan"));
    }

    #[test]
    fn test_parse_json_array_reports_index() {
        let text = r#"[{"input": {}, "output": {}}, {"input": 3, "output": {}}]"#;
        let err = Example::parse_json_array(text).unwrap_err();
        assert!(err.to_string().contains("example #1"));
    }

    #[test]
    fn test_deserialize_validates() {
        let result: std::result::Result<Example, _> =
            serde_json::from_str(r#"{"input": null, "output": {}}"#);
        assert!(result.is_err());
    }
}
