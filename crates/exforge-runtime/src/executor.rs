//! Extractor document executor
//!
//! Interprets operations step by step over JSON records.

use crate::builtins;
use crate::context::Frame;
use crate::error::{Result, RuntimeError};
use exforge_core::ast::{Condition, ExtractorDocument, Operation, Step, ValueExpr, ENTRY_OPERATION};
use exforge_core::{functions, Extractor, Record};
use exforge_parser::ExtractorParser;
use serde_json::Value;
use std::collections::HashMap;

/// Maximum depth of nested `invoke` calls
pub const MAX_CALL_DEPTH: usize = 32;

/// An extractor backed by a parsed document
#[derive(Debug, Clone)]
pub struct DslExtractor {
    document: ExtractorDocument,
    index: HashMap<String, usize>,
}

impl DslExtractor {
    /// Check the entry contract and prepare the document for execution
    ///
    /// Requires exactly one public `extract(input: record) -> record`, known
    /// built-in functions and invoked operations that exist with matching arity.
    pub fn compile(document: ExtractorDocument) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, op) in document.operations.iter().enumerate() {
            if index.insert(op.name.clone(), i).is_some() {
                return Err(RuntimeError::ContractViolation(format!(
                    "operation '{}' is defined more than once",
                    op.name
                )));
            }
        }

        let entry = document.entry().ok_or_else(|| {
            RuntimeError::ContractViolation(format!("no '{}' operation", ENTRY_OPERATION))
        })?;
        if !entry.has_entry_signature() {
            return Err(RuntimeError::ContractViolation(format!(
                "'{}' must be public with signature (input: record) -> record",
                ENTRY_OPERATION
            )));
        }

        for (_, function) in document.function_calls() {
            if functions::lookup(function).is_none() {
                return Err(RuntimeError::UnknownFunction(function.to_string()));
            }
        }

        for op in &document.operations {
            for step in &op.steps {
                let mut problem = None;
                step.walk(&mut |s| {
                    if problem.is_some() {
                        return;
                    }
                    if let Step::Invoke { operation, args, .. } = s {
                        problem = match index.get(operation.as_str()) {
                            None => Some(RuntimeError::UnknownOperation(operation.clone())),
                            Some(&target) if document.operations[target].params.len() != args.len() => {
                                Some(RuntimeError::ArityMismatch {
                                    callee: operation.clone(),
                                    expected: document.operations[target].params.len().to_string(),
                                    actual: args.len(),
                                })
                            }
                            Some(_) => None,
                        };
                    }
                });
                if let Some(err) = problem {
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            extractor = %document.metadata.name,
            operations = document.operations.len(),
            "compiled extractor document"
        );
        Ok(DslExtractor { document, index })
    }

    /// Parse and compile extractor source text
    pub fn from_source(source: &str) -> Result<Self> {
        let document = ExtractorParser::parse(source)?;
        Self::compile(document)
    }

    pub fn document(&self) -> &ExtractorDocument {
        &self.document
    }

    /// Run the entry operation on one input record
    pub fn run(&self, input: &Record) -> Result<Record> {
        if !input.is_object() {
            return Err(RuntimeError::type_error(
                ENTRY_OPERATION,
                "input must be a record",
            ));
        }
        self.call_operation(ENTRY_OPERATION, vec![input.clone()], 0)
    }

    fn operation(&self, name: &str) -> Result<&Operation> {
        self.index
            .get(name)
            .map(|&i| &self.document.operations[i])
            .ok_or_else(|| RuntimeError::UnknownOperation(name.to_string()))
    }

    fn call_operation(&self, name: &str, args: Vec<Value>, depth: usize) -> Result<Record> {
        if depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        let op = self.operation(name)?;
        if op.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch {
                callee: name.to_string(),
                expected: op.params.len().to_string(),
                actual: args.len(),
            });
        }

        let mut frame = Frame::new();
        for (param, value) in op.params.iter().zip(args) {
            frame.bind(param.name.clone(), value);
        }
        self.execute_steps(&op.steps, &mut frame, depth)?;
        Ok(frame.into_output())
    }

    fn execute_steps(&self, steps: &[Step], frame: &mut Frame, depth: usize) -> Result<()> {
        for step in steps {
            self.execute_step(step, frame, depth)?;
        }
        Ok(())
    }

    fn execute_step(&self, step: &Step, frame: &mut Frame, depth: usize) -> Result<()> {
        match step {
            Step::Set { target, value } => {
                let v = self.evaluate(value, frame)?;
                frame.write(target, v);
            }

            Step::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = if self.test(condition, frame)? {
                    then
                } else {
                    otherwise
                };
                self.execute_steps(branch, frame, depth)?;
            }

            Step::ForEach {
                source,
                binding,
                into,
                steps,
            } => {
                let items = match frame.resolve(source) {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items,
                    other => {
                        return Err(RuntimeError::type_error(
                            "for_each",
                            format!("'{}' is not a list: {}", source, other),
                        ))
                    }
                };

                let mut collected = Vec::with_capacity(items.len());
                for item in items {
                    let mut child = frame.child(binding, item);
                    self.execute_steps(steps, &mut child, depth)?;
                    collected.push(child.into_output());
                }
                frame.write(into, Value::Array(collected));
            }

            Step::Invoke {
                operation,
                args,
                into,
            } => {
                let values = args
                    .iter()
                    .map(|a| self.evaluate(a, frame))
                    .collect::<Result<Vec<_>>>()?;
                let result = self.call_operation(operation, values, depth + 1)?;
                match into {
                    Some(path) => frame.write(path, result),
                    None => frame.merge(result),
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, expr: &ValueExpr, frame: &Frame) -> Result<Value> {
        match expr {
            ValueExpr::Path(path) => Ok(frame.resolve(path)),
            ValueExpr::Literal(value) => Ok(value.clone()),
            ValueExpr::Call { function, args } => {
                let values = args
                    .iter()
                    .map(|a| self.evaluate(a, frame))
                    .collect::<Result<Vec<_>>>()?;
                builtins::call(function, values)
            }
        }
    }

    fn test(&self, condition: &Condition, frame: &Frame) -> Result<bool> {
        Ok(match condition {
            Condition::Exists(path) => !frame.resolve(path).is_null(),
            Condition::Missing(path) => frame.resolve(path).is_null(),
            Condition::Equals(l, r) => self.evaluate(l, frame)? == self.evaluate(r, frame)?,
            Condition::NotEquals(l, r) => self.evaluate(l, frame)? != self.evaluate(r, frame)?,
            Condition::All(items) => {
                for c in items {
                    if !self.test(c, frame)? {
                        return Ok(false);
                    }
                }
                true
            }
            Condition::Any(items) => {
                for c in items {
                    if self.test(c, frame)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }
}

impl Extractor for DslExtractor {
    fn name(&self) -> &str {
        &self.document.metadata.name
    }

    fn extract(&self, input: &Record) -> exforge_core::Result<Record> {
        self.run(input).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINIMAL: &str = r#"
extractor:
  name: minimal
  imports: [text]
operations:
  - name: extract
    visibility: public
    params:
      - name: input
        type: record
    returns: record
    steps:
      - set: name
        call: text.upper
        args: [input.name]
"#;

    #[test]
    fn test_compile_and_run() {
        let extractor = DslExtractor::from_source(MINIMAL).unwrap();
        assert_eq!(extractor.name(), "minimal");
        let out = extractor.extract(&json!({"name": "ada"})).unwrap();
        assert_eq!(out, json!({"name": "ADA"}));
    }

    #[test]
    fn test_non_record_input() {
        let extractor = DslExtractor::from_source(MINIMAL).unwrap();
        assert!(extractor.run(&json!([1, 2])).is_err());
        assert!(extractor.extract(&json!("x")).is_err());
    }

    #[test]
    fn test_entry_contract_required() {
        let source = MINIMAL.replace("returns: record", "returns: string");
        let err = DslExtractor::from_source(&source).unwrap_err();
        assert!(matches!(err, RuntimeError::ContractViolation(_)));

        let renamed = MINIMAL.replace("name: extract", "name: convert");
        assert!(matches!(
            DslExtractor::from_source(&renamed),
            Err(RuntimeError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_unknown_function_rejected_at_compile() {
        let source = MINIMAL.replace("text.upper", "text.reverse");
        assert!(matches!(
            DslExtractor::from_source(&source),
            Err(RuntimeError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            DslExtractor::from_source("extractor: ["),
            Err(RuntimeError::Parse(_))
        ));
    }
}
