//! YAML Parser
//!
//! Provides utilities for reading fields out of YAML values.

use crate::error::{ParseError, Result};
use serde_yaml::Value as YamlValue;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Get a required string field from YAML object
    pub fn get_string(obj: &YamlValue, field: &str, context: &str) -> Result<String> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Err(ParseError::MissingField {
                field: qualify(context, field),
            }),
            Some(v) => v.as_str().map(|s| s.to_string()).ok_or_else(|| {
                ParseError::InvalidValue {
                    field: qualify(context, field),
                    message: "expected a string".to_string(),
                }
            }),
        }
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get a required sequence field from YAML object
    pub fn get_array<'a>(
        obj: &'a YamlValue,
        field: &str,
        context: &str,
    ) -> Result<&'a Vec<YamlValue>> {
        match obj.get(field) {
            None => Err(ParseError::MissingField {
                field: qualify(context, field),
            }),
            Some(v) => v.as_sequence().ok_or_else(|| ParseError::InvalidValue {
                field: qualify(context, field),
                message: "expected a list".to_string(),
            }),
        }
    }

    /// Get an optional sequence field; present but not a list is an error
    pub fn get_optional_array<'a>(
        obj: &'a YamlValue,
        field: &str,
        context: &str,
    ) -> Result<Option<&'a Vec<YamlValue>>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(_) => Self::get_array(obj, field, context).map(Some),
        }
    }

    /// Get an optional list of strings
    pub fn get_string_list(obj: &YamlValue, field: &str, context: &str) -> Result<Vec<String>> {
        let Some(items) = Self::get_optional_array(obj, field, context)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: format!("{}[{}]", qualify(context, field), idx),
                        message: "expected a string".to_string(),
                    })
            })
            .collect()
    }

    /// Check if a field exists in YAML object
    pub fn has_field(obj: &YamlValue, field: &str) -> bool {
        obj.get(field).is_some()
    }

    /// Get all string keys from a YAML mapping, in document order
    pub fn get_keys(obj: &YamlValue) -> Vec<String> {
        if let Some(mapping) = obj.as_mapping() {
            mapping
                .keys()
                .filter_map(|k| k.as_str())
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Convert a YAML value into a JSON value
    pub fn to_json(value: &YamlValue, context: &str) -> Result<serde_json::Value> {
        serde_json::to_value(value).map_err(|e| ParseError::InvalidValue {
            field: context.to_string(),
            message: format!("not representable as JSON: {}", e),
        })
    }
}

/// Join a context path and a field name for error messages
pub(crate) fn qualify(context: &str, field: &str) -> String {
    if context.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", context, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_string_missing_and_wrong_type() {
        let yaml = YamlParser::parse("name: 3").unwrap();
        let err = YamlParser::get_string(&yaml, "name", "extractor").unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { ref field, .. } if field == "extractor.name"));

        let err = YamlParser::get_string(&yaml, "other", "").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                field: "other".to_string()
            }
        );
    }

    #[test]
    fn test_string_list() {
        let yaml = YamlParser::parse("imports: [text, coerce]").unwrap();
        assert_eq!(
            YamlParser::get_string_list(&yaml, "imports", "").unwrap(),
            vec!["text", "coerce"]
        );
        assert!(YamlParser::get_string_list(&yaml, "absent", "")
            .unwrap()
            .is_empty());

        let yaml = YamlParser::parse("imports: [1]").unwrap();
        assert!(YamlParser::get_string_list(&yaml, "imports", "").is_err());
    }

    #[test]
    fn test_to_json() {
        let yaml = YamlParser::parse("a: [1, true, null]").unwrap();
        let json = YamlParser::to_json(&yaml, "").unwrap();
        assert_eq!(json, serde_json::json!({"a": [1, true, null]}));
    }
}
