//! Per-operation complexity limits

use crate::checks::Check;
use crate::violation::{Severity, Violation};
use exforge_core::ast::ExtractorDocument;

pub struct ComplexityCheck {
    pub max_nesting_depth: usize,
    pub max_branches: usize,
    pub severity: Severity,
}

impl Check for ComplexityCheck {
    fn id(&self) -> &'static str {
        "complexity"
    }

    fn run(&self, _source: &str, document: Option<&ExtractorDocument>) -> Vec<Violation> {
        let Some(doc) = document else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for op in &doc.operations {
            let depth = op.nesting_depth();
            if depth > self.max_nesting_depth {
                out.push(
                    Violation::new(
                        "complexity.nesting_depth",
                        self.severity,
                        format!(
                            "nesting depth {} exceeds the limit of {}",
                            depth, self.max_nesting_depth
                        ),
                    )
                    .in_operation(&op.name, None),
                );
            }
            let branches = op.branch_count();
            if branches > self.max_branches {
                out.push(
                    Violation::new(
                        "complexity.branch_count",
                        self.severity,
                        format!(
                            "{} branches exceed the limit of {}",
                            branches, self.max_branches
                        ),
                    )
                    .in_operation(&op.name, None),
                );
            }
        }
        out
    }
}
