//! Document-level AST definitions

use super::step::Step;
use super::{ENTRY_OPERATION, RECORD_TYPE};
use serde::{Deserialize, Serialize};

/// Parsed extractor document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorDocument {
    pub metadata: ExtractorMetadata,
    pub operations: Vec<Operation>,
}

/// Extractor header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorMetadata {
    /// Extractor name
    pub name: String,

    /// Optional version string (e.g. "1.0.0")
    pub version: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Declared function modules (e.g. "text", "coerce")
    pub imports: Vec<String>,
}

/// Operation visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub param_type: Option<String>,
}

/// A named operation: parameters, an optional return type and a step list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub visibility: Visibility,
    pub description: Option<String>,
    pub params: Vec<Param>,
    pub returns: Option<String>,
    pub steps: Vec<Step>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Operation {
            name: name.into(),
            visibility: Visibility::Private,
            description: None,
            params: Vec::new(),
            returns: None,
            steps: Vec::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, param_type: Option<&str>) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type: param_type.map(str::to_string),
        });
        self
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Deepest block nesting across the operation's steps
    pub fn nesting_depth(&self) -> usize {
        self.steps.iter().map(Step::nesting_depth).max().unwrap_or(0)
    }

    /// Number of conditional branch points in the operation
    pub fn branch_count(&self) -> usize {
        self.steps.iter().map(Step::branch_count).sum()
    }

    /// Whether this operation satisfies `extract(input: record) -> record`
    pub fn has_entry_signature(&self) -> bool {
        self.name == ENTRY_OPERATION
            && self.is_public()
            && self.params.len() == 1
            && self.params[0].param_type.as_deref() == Some(RECORD_TYPE)
            && self.returns.as_deref() == Some(RECORD_TYPE)
    }
}

impl ExtractorDocument {
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn entry(&self) -> Option<&Operation> {
        self.operation(ENTRY_OPERATION)
    }

    /// Every function called anywhere in the document, with the calling operation
    pub fn function_calls(&self) -> Vec<(&str, &str)> {
        let mut calls = Vec::new();
        for op in &self.operations {
            for step in &op.steps {
                step.walk(&mut |s| {
                    for name in s.direct_function_calls() {
                        calls.push((op.name.as_str(), name));
                    }
                });
            }
        }
        calls
    }

    /// Every helper invocation in the document, with the calling operation
    pub fn invocations(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for op in &self.operations {
            for step in &op.steps {
                step.walk(&mut |s| {
                    if let Step::Invoke { operation, .. } = s {
                        out.push((op.name.as_str(), operation.as_str()));
                    }
                });
            }
        }
        out
    }
}
