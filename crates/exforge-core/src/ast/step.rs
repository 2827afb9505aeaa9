//! Step, value and condition AST nodes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expression producing a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueExpr {
    /// Dotted path rooted at a bound name (parameter or loop variable)
    Path(String),

    /// Literal JSON value
    Literal(Value),

    /// Built-in function call
    Call { function: String, args: Vec<ValueExpr> },
}

impl ValueExpr {
    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let ValueExpr::Call { function, args } = self {
            out.push(function.as_str());
            for arg in args {
                arg.collect_calls(out);
            }
        }
    }
}

/// Branch condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Exists(String),
    Missing(String),
    Equals(ValueExpr, ValueExpr),
    NotEquals(ValueExpr, ValueExpr),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Exists(_) | Condition::Missing(_) => {}
            Condition::Equals(l, r) | Condition::NotEquals(l, r) => {
                l.collect_calls(out);
                r.collect_calls(out);
            }
            Condition::All(items) | Condition::Any(items) => {
                for c in items {
                    c.collect_calls(out);
                }
            }
        }
    }
}

/// Operation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Write a value to a path of the operation's output record
    Set { target: String, value: ValueExpr },

    /// Conditional block
    If {
        condition: Condition,
        then: Vec<Step>,
        otherwise: Vec<Step>,
    },

    /// Run `steps` for every element of an array, collecting each
    /// iteration's output record into a list written at `into`
    ForEach {
        source: String,
        binding: String,
        into: String,
        steps: Vec<Step>,
    },

    /// Call a helper operation; its output is written at `into`,
    /// or merged into the current output when `into` is absent
    Invoke {
        operation: String,
        args: Vec<ValueExpr>,
        into: Option<String>,
    },
}

impl Step {
    /// Block nesting depth: simple steps are 0, each `if`/`for_each` adds one
    pub fn nesting_depth(&self) -> usize {
        match self {
            Step::Set { .. } | Step::Invoke { .. } => 0,
            Step::If {
                then, otherwise, ..
            } => {
                1 + then
                    .iter()
                    .chain(otherwise.iter())
                    .map(Step::nesting_depth)
                    .max()
                    .unwrap_or(0)
            }
            Step::ForEach { steps, .. } => {
                1 + steps.iter().map(Step::nesting_depth).max().unwrap_or(0)
            }
        }
    }

    /// Number of `if` steps in this subtree
    pub fn branch_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |s| {
            if matches!(s, Step::If { .. }) {
                count += 1;
            }
        });
        count
    }

    /// Visit this step and all nested steps, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Step)) {
        visit(self);
        match self {
            Step::If {
                then, otherwise, ..
            } => {
                for s in then.iter().chain(otherwise.iter()) {
                    s.walk(visit);
                }
            }
            Step::ForEach { steps, .. } => {
                for s in steps {
                    s.walk(visit);
                }
            }
            Step::Set { .. } | Step::Invoke { .. } => {}
        }
    }

    /// Functions called by this step itself, not by nested steps
    pub fn direct_function_calls(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match self {
            Step::Set { value, .. } => value.collect_calls(&mut out),
            Step::If { condition, .. } => condition.collect_calls(&mut out),
            Step::ForEach { .. } => {}
            Step::Invoke { args, .. } => {
                for a in args {
                    a.collect_calls(&mut out);
                }
            }
        }
        out
    }

    /// Short keyword for diagnostics
    pub fn keyword(&self) -> &'static str {
        match self {
            Step::Set { .. } => "set",
            Step::If { .. } => "if",
            Step::ForEach { .. } => "for_each",
            Step::Invoke { .. } => "invoke",
        }
    }
}
