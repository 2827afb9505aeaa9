//! Synthesis specification and prompt rendering
//!
//! Rendering is a pure function of its inputs: patterns are re-sorted,
//! schema fields keep declaration order and no hash-ordered collection is
//! iterated, so identical inputs always produce byte-identical text.

use crate::error::{LLMError, Result};
use crate::generator::templates::{
    DSL_REFERENCE, IMPLEMENT_PROMPT, PLAN_PROMPT, RETRY_FEEDBACK,
};
use exforge_core::ast::{ENTRY_OPERATION, RECORD_TYPE};
use exforge_core::{Pattern, TargetSchema};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Constraints the generated code must satisfy
///
/// Mirrors the validation configuration so a compliant model can pass
/// validation on its first attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConstraints {
    pub forbidden_imports: Vec<String>,
    pub forbidden_functions: Vec<String>,
    pub max_nesting_depth: usize,
    pub max_branches: usize,
    pub require_documentation: bool,
}

impl Default for PromptConstraints {
    fn default() -> Self {
        Self {
            forbidden_imports: ["process", "shell", "net", "fs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            forbidden_functions: [
                "process.exec",
                "shell.run",
                "fs.write",
                "fs.delete",
                "net.fetch",
                "eval",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_nesting_depth: 3,
            max_branches: 8,
            require_documentation: true,
        }
    }
}

/// Structured specification handed to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisSpec {
    pub component_name: String,
    pub schema: TargetSchema,
    pub patterns: Vec<Pattern>,
    pub constraints: PromptConstraints,
}

/// Builds synthesis specifications
pub struct PromptGenerator;

impl PromptGenerator {
    /// Build the specification from accepted patterns, the target schema and constraints
    pub fn generate(
        component_name: &str,
        accepted: &[&Pattern],
        schema: &TargetSchema,
        constraints: &PromptConstraints,
    ) -> SynthesisSpec {
        let mut patterns: Vec<Pattern> = accepted.iter().map(|p| (*p).clone()).collect();
        patterns.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.source_path.cmp(&b.source_path))
                .then_with(|| a.target_path.cmp(&b.target_path))
        });

        SynthesisSpec {
            component_name: component_name.to_string(),
            schema: schema.clone(),
            patterns,
            constraints: constraints.clone(),
        }
    }
}

impl SynthesisSpec {
    /// Render the specification as prompt text
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Extractor specification: {}", self.component_name);
        let _ = writeln!(out);

        let _ = writeln!(out, "## Entry contract");
        let _ = writeln!(
            out,
            "Expose exactly one public operation `{}(input: {}) -> {}`.",
            ENTRY_OPERATION, RECORD_TYPE, RECORD_TYPE
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "## Target schema: {}", self.schema.name);
        if let Some(desc) = &self.schema.description {
            let _ = writeln!(out, "{}", desc);
        }
        for field in &self.schema.fields {
            let _ = write!(
                out,
                "- {} ({}, {})",
                field.path,
                field.field_type,
                if field.required { "required" } else { "optional" }
            );
            if let Some(desc) = &field.description {
                let _ = write!(out, ": {}", desc);
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## Observed patterns");
        if self.patterns.is_empty() {
            let _ = writeln!(out, "(none above the confidence threshold)");
        }
        for p in &self.patterns {
            let _ = write!(
                out,
                "- {} -> {} [{}, {}, confidence {:.2}]",
                p.source_path, p.target_path, p.pattern_type, p.transformation, p.confidence
            );
            if let Some(function) = p.transformation.dsl_function() {
                let _ = write!(out, " via {}", function);
            }
            let _ = writeln!(out);
            for (raw_in, raw_out) in &p.examples {
                let _ = writeln!(out, "    e.g. {} => {}", raw_in, raw_out);
            }
        }
        let _ = writeln!(out);

        let c = &self.constraints;
        let _ = writeln!(out, "## Constraints");
        let _ = writeln!(out, "- Forbidden imports: {}", c.forbidden_imports.join(", "));
        let _ = writeln!(
            out,
            "- Forbidden functions: {}",
            c.forbidden_functions.join(", ")
        );
        let _ = writeln!(out, "- Only call built-in functions from declared imports");
        let _ = writeln!(
            out,
            "- Max nesting depth per operation: {}",
            c.max_nesting_depth
        );
        let _ = writeln!(out, "- Max branches per operation: {}", c.max_branches);
        if c.require_documentation {
            let _ = writeln!(
                out,
                "- Document the extractor and every public operation; annotate parameter and return types"
            );
        }
        let _ = writeln!(out);

        out.push_str(DSL_REFERENCE);
        out.push('\n');
        out
    }

    /// Prompt for the planning call
    pub fn plan_prompt(&self) -> String {
        PLAN_PROMPT.replace("{specification}", &self.render())
    }

    /// Prompt for an implementation attempt
    ///
    /// `feedback` carries the attempt number and violation report of the
    /// previous attempt when retrying.
    pub fn implementation_prompt(&self, plan: &SynthesisPlan, feedback: Option<(u32, &str)>) -> String {
        let feedback_text = match feedback {
            Some((attempt, violations)) => RETRY_FEEDBACK
                .replace("{attempt}", &attempt.to_string())
                .replace("{violations}", violations),
            None => String::new(),
        };
        IMPLEMENT_PROMPT
            .replace("{specification}", &self.render())
            .replace("{plan}", plan.to_yaml().trim_end())
            .replace("{feedback}", &feedback_text)
    }
}

/// One planned target field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedField {
    pub target: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub approach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// Plan returned by the planning call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPlan {
    #[serde(default)]
    pub fields: Vec<PlannedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct PlanDocument {
    plan: SynthesisPlan,
}

impl SynthesisPlan {
    /// Parse a plan document (top-level `plan:` key)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let doc: PlanDocument = serde_yaml::from_str(yaml)?;
        if doc.plan.fields.is_empty() {
            return Err(LLMError::InvalidResponse(
                "plan does not list any fields".to_string(),
            ));
        }
        Ok(doc.plan)
    }

    /// Serialize as a plan document
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&PlanDocument { plan: self.clone() }).unwrap_or_default()
    }

    /// Target fields of `schema` the plan does not mention
    pub fn missing_targets<'a>(&self, schema: &'a TargetSchema) -> Vec<&'a str> {
        schema
            .fields
            .iter()
            .filter(|f| !self.fields.iter().any(|p| p.target == f.path))
            .map(|f| f.path.as_str())
            .collect()
    }
}
