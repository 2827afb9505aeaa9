//! Entry contract and call-site checks

use crate::checks::{walk_steps, Check};
use crate::violation::Violation;
use exforge_core::ast::{
    Condition, ExtractorDocument, Step, ValueExpr, ENTRY_OPERATION, RECORD_TYPE,
};
use exforge_core::functions;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub struct InterfaceCheck;

impl Check for InterfaceCheck {
    fn id(&self) -> &'static str {
        "interface"
    }

    fn run(&self, _source: &str, document: Option<&ExtractorDocument>) -> Vec<Violation> {
        let Some(doc) = document else {
            return Vec::new();
        };
        let mut out = Vec::new();

        let mut seen = HashSet::new();
        for op in &doc.operations {
            if !seen.insert(op.name.as_str()) {
                out.push(
                    Violation::error(
                        "interface.duplicate_operation",
                        format!("operation '{}' is defined more than once", op.name),
                    )
                    .in_operation(&op.name, None),
                );
            }
        }

        let entries: Vec<_> = doc
            .operations
            .iter()
            .filter(|op| op.name == ENTRY_OPERATION)
            .collect();
        match entries.first() {
            None => out.push(Violation::error(
                "interface.missing_entry",
                format!(
                    "no '{}' operation; expected {}(input: {}) -> {}",
                    ENTRY_OPERATION, ENTRY_OPERATION, RECORD_TYPE, RECORD_TYPE
                ),
            )),
            Some(entry) => {
                if !entry.is_public() {
                    out.push(
                        Violation::error(
                            "interface.entry_not_public",
                            format!("'{}' must be public", ENTRY_OPERATION),
                        )
                        .in_operation(&entry.name, None),
                    );
                }
                let typed_record_param = entry.params.len() == 1
                    && entry.params[0].param_type.as_deref() == Some(RECORD_TYPE);
                if !typed_record_param {
                    out.push(
                        Violation::error(
                            "interface.entry_signature",
                            format!(
                                "'{}' must take exactly one parameter of type {}",
                                ENTRY_OPERATION, RECORD_TYPE
                            ),
                        )
                        .in_operation(&entry.name, None),
                    );
                }
                if entry.returns.as_deref() != Some(RECORD_TYPE) {
                    out.push(
                        Violation::error(
                            "interface.entry_signature",
                            format!("'{}' must return {}", ENTRY_OPERATION, RECORD_TYPE),
                        )
                        .in_operation(&entry.name, None),
                    );
                }
            }
        }

        for op in &doc.operations {
            walk_steps(&op.steps, "steps", &mut |step, path| {
                if let Step::Invoke {
                    operation, args, ..
                } = step
                {
                    let problem = match doc.operation(operation) {
                        None => Some((
                            "interface.unknown_operation",
                            format!("invoked operation '{}' does not exist", operation),
                        )),
                        Some(target) if target.name == ENTRY_OPERATION => Some((
                            "interface.recursive_entry",
                            format!("'{}' cannot be invoked as a helper", ENTRY_OPERATION),
                        )),
                        Some(target) if target.params.len() != args.len() => Some((
                            "interface.invoke_arity",
                            format!(
                                "'{}' takes {} argument(s), {} given",
                                operation,
                                target.params.len(),
                                args.len()
                            ),
                        )),
                        Some(_) => None,
                    };
                    if let Some((rule_id, message)) = problem {
                        out.push(
                            Violation::error(rule_id, message)
                                .in_operation(&op.name, Some(path.to_string())),
                        );
                    }
                }

                for (function, argc) in calls_with_arity(step) {
                    let Some(spec) = functions::lookup(function) else {
                        continue;
                    };
                    if !spec.accepts_arity(argc) {
                        out.push(
                            Violation::error(
                                "interface.call_arity",
                                format!("'{}' does not accept {} argument(s)", function, argc),
                            )
                            .in_operation(&op.name, Some(path.to_string())),
                        );
                    }
                }
            });
        }

        for name in operations_on_cycles(doc) {
            out.push(
                Violation::error(
                    "interface.invoke_cycle",
                    format!("operation '{}' can invoke itself through helper calls", name),
                )
                .in_operation(name, None),
            );
        }

        out
    }
}

/// Helper operations that can reach themselves through `invoke`
///
/// Invocations of the entry operation are reported separately and left out
/// of the graph.
fn operations_on_cycles(doc: &ExtractorDocument) -> Vec<&str> {
    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (from, to) in doc.invocations() {
        if to != ENTRY_OPERATION {
            edges.entry(from).or_default().insert(to);
        }
    }

    let mut seen = HashSet::new();
    doc.operations
        .iter()
        .map(|op| op.name.as_str())
        .filter(|name| seen.insert(*name))
        .filter(|name| reaches(&edges, name, name))
        .collect()
}

fn reaches(edges: &BTreeMap<&str, BTreeSet<&str>>, from: &str, target: &str) -> bool {
    let mut stack: Vec<&str> = edges
        .get(from)
        .map(|next| next.iter().copied().collect())
        .unwrap_or_default();
    let mut visited = HashSet::new();
    while let Some(name) = stack.pop() {
        if name == target {
            return true;
        }
        if visited.insert(name) {
            if let Some(next) = edges.get(name) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}

/// Function calls made directly by a step, with their argument counts
fn calls_with_arity(step: &Step) -> Vec<(&str, usize)> {
    fn from_expr<'a>(expr: &'a ValueExpr, out: &mut Vec<(&'a str, usize)>) {
        if let ValueExpr::Call { function, args } = expr {
            out.push((function.as_str(), args.len()));
            for a in args {
                from_expr(a, out);
            }
        }
    }
    fn from_condition<'a>(cond: &'a Condition, out: &mut Vec<(&'a str, usize)>) {
        match cond {
            Condition::Exists(_) | Condition::Missing(_) => {}
            Condition::Equals(l, r) | Condition::NotEquals(l, r) => {
                from_expr(l, out);
                from_expr(r, out);
            }
            Condition::All(items) | Condition::Any(items) => {
                for c in items {
                    from_condition(c, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    match step {
        Step::Set { value, .. } => from_expr(value, &mut out),
        Step::If { condition, .. } => from_condition(condition, &mut out),
        Step::Invoke { args, .. } => {
            for a in args {
                from_expr(a, &mut out);
            }
        }
        Step::ForEach { .. } => {}
    }
    out
}
