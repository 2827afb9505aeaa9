//! Forbidden capabilities, undeclared imports and unknown functions

use crate::checks::{walk_steps, Check};
use crate::violation::Violation;
use exforge_core::ast::ExtractorDocument;
use exforge_core::functions;

pub struct ForbiddenCheck {
    pub forbidden_imports: Vec<String>,
    pub forbidden_functions: Vec<String>,
}

impl ForbiddenCheck {
    fn is_forbidden_function(&self, name: &str) -> bool {
        self.forbidden_functions.iter().any(|f| f == name)
            || functions::module_of(name)
                .map_or(false, |m| self.forbidden_imports.iter().any(|i| i == m))
    }
}

impl Check for ForbiddenCheck {
    fn id(&self) -> &'static str {
        "forbidden"
    }

    fn run(&self, _source: &str, document: Option<&ExtractorDocument>) -> Vec<Violation> {
        let Some(doc) = document else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let imports = &doc.metadata.imports;

        for import in imports {
            if self.forbidden_imports.iter().any(|f| f == import) {
                out.push(Violation::error(
                    "forbidden.import",
                    format!("import of module '{}' is not allowed", import),
                ));
            }
        }

        for op in &doc.operations {
            walk_steps(&op.steps, "steps", &mut |step, path| {
                for function in step.direct_function_calls() {
                    let located = |v: Violation| v.in_operation(&op.name, Some(path.to_string()));

                    if self.is_forbidden_function(function) {
                        out.push(located(Violation::error(
                            "forbidden.function",
                            format!("call to '{}' is not allowed", function),
                        )));
                        continue;
                    }

                    if functions::lookup(function).is_none() {
                        out.push(located(Violation::error(
                            "forbidden.unknown_function",
                            format!("'{}' is not a built-in function", function),
                        )));
                        continue;
                    }

                    let declared = functions::module_of(function)
                        .map_or(false, |m| imports.iter().any(|i| i == m));
                    if !declared {
                        out.push(located(Violation::error(
                            "forbidden.undeclared_import",
                            format!(
                                "'{}' is called but its module is not listed in imports",
                                function
                            ),
                        )));
                    }
                }
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnforcerConfig;
    use exforge_parser::ExtractorParser;

    fn check() -> ForbiddenCheck {
        let config = EnforcerConfig::default();
        ForbiddenCheck {
            forbidden_imports: config.forbidden_imports,
            forbidden_functions: config.forbidden_functions,
        }
    }

    fn source(imports: &str, call: &str) -> String {
        format!(
            "extractor:\n  name: t\n  imports: {}\noperations:\n  - name: extract\n    params: [input]\n    steps:\n      - set: a\n        call: {}\n        args: [input.a]\n",
            imports, call
        )
    }

    fn rule_ids(src: &str) -> Vec<String> {
        let doc = ExtractorParser::parse(src).unwrap();
        check()
            .run(src, Some(&doc))
            .into_iter()
            .map(|v| v.rule_id)
            .collect()
    }

    #[test]
    fn test_forbidden_import_and_function() {
        assert_eq!(
            rule_ids(&source("[process]", "process.exec")),
            vec!["forbidden.import", "forbidden.function"]
        );
        assert_eq!(rule_ids(&source("[]", "eval")), vec!["forbidden.function"]);
    }

    #[test]
    fn test_unknown_and_undeclared() {
        assert_eq!(
            rule_ids(&source("[text]", "text.reverse")),
            vec!["forbidden.unknown_function"]
        );
        assert_eq!(
            rule_ids(&source("[]", "text.lower")),
            vec!["forbidden.undeclared_import"]
        );
        assert!(rule_ids(&source("[text]", "text.lower")).is_empty());
    }
}
