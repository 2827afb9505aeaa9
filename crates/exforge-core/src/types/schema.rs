//! Target output schema

use crate::error::{CoreError, Result};
use crate::types::record::{get_path, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Value type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Object,
    Array,
    Any,
}

impl FieldType {
    /// Whether a JSON value has this type. Null never matches.
    pub fn matches(&self, value: &Record) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
            FieldType::Any => !value.is_null(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        };
        write!(f, "{}", s)
    }
}

/// One field of the target schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub path: String,
    pub field_type: FieldType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl SchemaField {
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path: path.into(),
            field_type,
            required: true,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Shape of the records a synthesized extractor must produce
///
/// Field order is significant and preserved through serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl TargetSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, path: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Check the schema is well formed: non-empty name, non-empty unique paths
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidSchema("schema name is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.path.trim().is_empty() {
                return Err(CoreError::InvalidSchema(format!(
                    "schema '{}' has a field with an empty path",
                    self.name
                )));
            }
            if !seen.insert(field.path.as_str()) {
                return Err(CoreError::InvalidSchema(format!(
                    "duplicate field path '{}'",
                    field.path
                )));
            }
        }
        Ok(())
    }

    /// Check a record against the schema, returning one message per mismatch
    pub fn conformance_issues(&self, record: &Record) -> Vec<String> {
        let mut issues = Vec::new();
        for field in &self.fields {
            match get_path(record, &field.path) {
                None | Some(Record::Null) => {
                    if field.required {
                        issues.push(format!("missing required field '{}'", field.path));
                    }
                }
                Some(value) => {
                    if !field.field_type.matches(value) {
                        issues.push(format!(
                            "field '{}' expected {}, got {}",
                            field.path, field.field_type, value
                        ));
                    }
                }
            }
        }
        issues
    }
}
