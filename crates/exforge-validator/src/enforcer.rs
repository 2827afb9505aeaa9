//! Constraint enforcer
//!
//! Holds the active check set behind an `Arc`. A validation clones the `Arc`
//! once at the start, so a concurrent `update_config` never changes the
//! checks a running validation uses.

use crate::checks::{
    Check, ComplexityCheck, DocumentationCheck, ForbiddenCheck, InterfaceCheck, SyntaxCheck,
};
use crate::config::EnforcerConfig;
use crate::error::{Result, ValidatorError};
use crate::violation::ValidationResult;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Checks built from one configuration
struct CheckSet {
    config: EnforcerConfig,
    checks: Vec<Box<dyn Check>>,
}

impl CheckSet {
    fn build(config: EnforcerConfig) -> Self {
        let mut checks: Vec<Box<dyn Check>> = vec![
            Box::new(InterfaceCheck),
            Box::new(ComplexityCheck {
                max_nesting_depth: config.max_nesting_depth,
                max_branches: config.max_branches,
                severity: config.complexity_severity,
            }),
        ];
        if config.require_documentation {
            checks.push(Box::new(DocumentationCheck));
        }
        checks.push(Box::new(ForbiddenCheck {
            forbidden_imports: config.forbidden_imports.clone(),
            forbidden_functions: config.forbidden_functions.clone(),
        }));
        Self { config, checks }
    }
}

/// Runs the static checks over candidate extractor source
pub struct ConstraintEnforcer {
    active: RwLock<Arc<CheckSet>>,
}

impl Default for ConstraintEnforcer {
    fn default() -> Self {
        Self {
            active: RwLock::new(Arc::new(CheckSet::build(EnforcerConfig::default()))),
        }
    }
}

impl ConstraintEnforcer {
    /// Create an enforcer with a validated configuration
    pub fn new(config: EnforcerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            active: RwLock::new(Arc::new(CheckSet::build(config))),
        })
    }

    fn snapshot(&self) -> Arc<CheckSet> {
        match self.active.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Current configuration
    pub fn config(&self) -> EnforcerConfig {
        self.snapshot().config.clone()
    }

    /// Identifiers of the active checks, in execution order
    pub fn check_ids(&self) -> Vec<&'static str> {
        let set = self.snapshot();
        std::iter::once(SyntaxCheck.id())
            .chain(set.checks.iter().map(|c| c.id()))
            .collect()
    }

    /// Validate then swap in a new configuration
    pub fn update_config(&self, config: EnforcerConfig) -> Result<()> {
        config.validate()?;
        let next = Arc::new(CheckSet::build(config));
        match self.active.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!("enforcer configuration updated");
        Ok(())
    }

    /// Run every check over `source`
    ///
    /// A syntax failure short-circuits the remaining checks.
    pub fn validate_code(&self, source: &str) -> ValidationResult {
        let start = Instant::now();
        let set = self.snapshot();

        let document = match SyntaxCheck::parse(source) {
            Ok(doc) => doc,
            Err(violation) => {
                tracing::debug!(rule = %violation.rule_id, "candidate failed to parse");
                return ValidationResult::from_violations(
                    vec![violation],
                    None,
                    start.elapsed().as_millis() as u64,
                );
            }
        };

        let violations: Vec<_> = set
            .checks
            .iter()
            .flat_map(|check| check.run(source, Some(&document)))
            .collect();

        let result = ValidationResult::from_violations(
            violations,
            Some(document.metadata.name.clone()),
            start.elapsed().as_millis() as u64,
        );
        tracing::debug!(
            extractor = %document.metadata.name,
            errors = result.error_count,
            warnings = result.warning_count,
            "candidate validated"
        );
        result
    }

    /// Read a file and validate its contents
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidationResult> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| ValidatorError::from_io(path, e))?;
        Ok(self.validate_code(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_order() {
        let enforcer = ConstraintEnforcer::default();
        assert_eq!(
            enforcer.check_ids(),
            vec!["syntax", "interface", "complexity", "documentation", "forbidden"]
        );

        let relaxed = EnforcerConfig {
            require_documentation: false,
            ..EnforcerConfig::default()
        };
        enforcer.update_config(relaxed).unwrap();
        assert_eq!(
            enforcer.check_ids(),
            vec!["syntax", "interface", "complexity", "forbidden"]
        );
    }

    #[test]
    fn test_invalid_update_keeps_previous() {
        let enforcer = ConstraintEnforcer::default();
        let bad = EnforcerConfig::default().with_max_nesting_depth(0);
        assert!(matches!(
            enforcer.update_config(bad),
            Err(ValidatorError::InvalidConfig(_))
        ));
        assert_eq!(enforcer.config().max_nesting_depth, 3);
    }

    #[test]
    fn test_snapshot_survives_update() {
        let enforcer = ConstraintEnforcer::default();
        let before = enforcer.snapshot();
        enforcer
            .update_config(EnforcerConfig::default().with_max_branches(1))
            .unwrap();
        assert_eq!(before.config.max_branches, 8);
        assert_eq!(enforcer.config().max_branches, 1);
    }
}
