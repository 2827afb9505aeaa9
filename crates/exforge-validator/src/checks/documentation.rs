//! Documentation requirements

use crate::checks::Check;
use crate::violation::Violation;
use exforge_core::ast::ExtractorDocument;

pub struct DocumentationCheck;

fn blank(text: &Option<String>) -> bool {
    text.as_deref().map_or(true, |t| t.trim().is_empty())
}

impl Check for DocumentationCheck {
    fn id(&self) -> &'static str {
        "documentation"
    }

    fn run(&self, _source: &str, document: Option<&ExtractorDocument>) -> Vec<Violation> {
        let Some(doc) = document else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if blank(&doc.metadata.description) {
            out.push(Violation::warning(
                "documentation.extractor_description",
                format!("extractor '{}' has no description", doc.metadata.name),
            ));
        }

        for op in &doc.operations {
            if op.is_public() && blank(&op.description) {
                out.push(
                    Violation::warning(
                        "documentation.operation_description",
                        format!("public operation '{}' has no description", op.name),
                    )
                    .in_operation(&op.name, None),
                );
            }
            for param in op.params.iter().filter(|p| p.param_type.is_none()) {
                out.push(
                    Violation::warning(
                        "documentation.param_type",
                        format!("parameter '{}' has no type annotation", param.name),
                    )
                    .in_operation(&op.name, None),
                );
            }
            if op.returns.is_none() {
                out.push(
                    Violation::warning(
                        "documentation.return_type",
                        format!("operation '{}' has no return type annotation", op.name),
                    )
                    .in_operation(&op.name, None),
                );
            }
        }
        out
    }
}
