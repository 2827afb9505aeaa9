//! Execution frames
//!
//! A frame holds the names bound while an operation runs (its parameters
//! and any enclosing loop variables) and the output record being built.

use exforge_core::types::record;
use exforge_core::Record;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Bindings and output for one operation call or loop iteration
#[derive(Debug, Clone)]
pub struct Frame {
    bindings: HashMap<String, Value>,
    output: Record,
}

impl Frame {
    pub fn new() -> Self {
        Frame {
            bindings: HashMap::new(),
            output: Value::Object(Map::new()),
        }
    }

    /// Bind a name, shadowing any previous binding with the same name
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Child frame for a loop iteration: same bindings plus `name`, fresh output
    pub fn child(&self, name: &str, value: Value) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.insert(name.to_string(), value);
        Frame {
            bindings,
            output: Value::Object(Map::new()),
        }
    }

    /// Resolve a dotted path whose first segment is a bound name
    ///
    /// Unbound roots and missing fields resolve to null.
    pub fn resolve(&self, path: &str) -> Value {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, rest),
            None => (path, ""),
        };
        let Some(bound) = self.bindings.get(root) else {
            tracing::debug!(path, "unbound path root, resolving to null");
            return Value::Null;
        };
        record::get_path(bound, rest).cloned().unwrap_or(Value::Null)
    }

    /// Write `value` at `path` of the output record
    pub fn write(&mut self, path: &str, value: Value) {
        record::set_path(&mut self.output, path, value);
    }

    /// Shallow-merge the keys of an object into the output record
    pub fn merge(&mut self, value: Value) {
        if let (Value::Object(target), Value::Object(source)) = (&mut self.output, value) {
            for (key, v) in source {
                target.insert(key, v);
            }
        }
    }

    pub fn output(&self) -> &Record {
        &self.output
    }

    pub fn into_output(self) -> Record {
        self.output
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
