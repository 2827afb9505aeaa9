//! Unit tests for the constraint enforcer

use exforge_validator::*;
use std::fs;
use tempfile::TempDir;

const VALID_EXTRACTOR: &str = r#"
extractor:
  name: person_extractor
  version: "1.0.0"
  description: Builds a person record
  imports: [text, coerce]
operations:
  - name: extract
    visibility: public
    description: Entry point
    params:
      - name: input
        type: record
    returns: record
    steps:
      - set: fullName
        call: text.join
        args: [" ", input.first, input.last]
      - set: age
        call: coerce.to_integer
        args: [input.age]
"#;

fn deeply_nested(levels: usize) -> String {
    let mut steps = String::from("set: x\nvalue: 1\n");
    for _ in 0..levels {
        let indented: String = steps
            .lines()
            .enumerate()
            .map(|(i, l)| {
                if i == 0 {
                    format!("  - {}\n", l)
                } else {
                    format!("    {}\n", l)
                }
            })
            .collect();
        steps = format!("if:\n  exists: input.a\nthen:\n{}", indented);
    }
    let body: String = steps
        .lines()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                format!("      - {}\n", l)
            } else {
                format!("        {}\n", l)
            }
        })
        .collect();
    format!(
        "extractor:\n  name: deep\n  description: d\noperations:\n  - name: extract\n    visibility: public\n    description: e\n    params:\n      - name: input\n        type: record\n    returns: record\n    steps:\n{}",
        body
    )
}

// =============================================================================
// validate_code
// =============================================================================

#[test]
fn test_valid_extractor_has_no_violations() {
    let result = ConstraintEnforcer::default().validate_code(VALID_EXTRACTOR);
    assert!(result.valid, "unexpected violations:\n{}", result.report());
    assert!(result.violations.is_empty());
    assert_eq!(result.extractor_name.as_deref(), Some("person_extractor"));
}

#[test]
fn test_syntax_error_short_circuits() {
    let result = ConstraintEnforcer::default().validate_code("extractor: [\n  broken");
    assert!(!result.valid);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].rule_id, "syntax.parse_error");
    assert!(result.extractor_name.is_none());
}

#[test]
fn test_complexity_warning_by_default() {
    let source = deeply_nested(4);
    let result = ConstraintEnforcer::default().validate_code(&source);
    assert!(result.valid, "{}", result.report());
    assert!(result.has_rule("complexity.nesting_depth"));
    assert_eq!(result.warning_count, 1);
}

#[test]
fn test_complexity_error_when_configured() {
    let config = EnforcerConfig::default().with_complexity_severity(Severity::Error);
    let enforcer = ConstraintEnforcer::new(config).unwrap();

    assert!(enforcer.validate_code(&deeply_nested(3)).valid);

    let result = enforcer.validate_code(&deeply_nested(4));
    assert!(!result.valid);
    assert_eq!(result.error_count, 1);
}

#[test]
fn test_branch_limit() {
    let enforcer = ConstraintEnforcer::new(
        EnforcerConfig::default()
            .with_max_branches(2)
            .with_complexity_severity(Severity::Error),
    )
    .unwrap();
    let result = enforcer.validate_code(&deeply_nested(3));
    assert!(result.has_rule("complexity.branch_count"));
    assert!(!result.valid);
}

#[test]
fn test_documentation_warnings() {
    let source = VALID_EXTRACTOR
        .replace("  description: Builds a person record\n", "")
        .replace("    description: Entry point\n", "");
    let result = ConstraintEnforcer::default().validate_code(&source);
    assert!(result.valid);
    assert!(result.has_rule("documentation.extractor_description"));
    assert!(result.has_rule("documentation.operation_description"));
}

#[test]
fn test_forbidden_function_is_error() {
    let source = VALID_EXTRACTOR.replace("coerce.to_integer", "shell.run");
    let result = ConstraintEnforcer::default().validate_code(&source);
    assert!(!result.valid);
    assert!(result.has_rule("forbidden.function"));
    assert!(result.report().contains("shell.run"));
}

#[test]
fn test_missing_entry_is_error() {
    let source = VALID_EXTRACTOR.replace("name: extract\n", "name: convert\n");
    let result = ConstraintEnforcer::default().validate_code(&source);
    assert!(!result.valid);
    assert!(result.has_rule("interface.missing_entry"));
}

#[test]
fn test_duplicate_operation() {
    let source = format!(
        "{}  - name: extract\n    visibility: public\n    description: again\n    params:\n      - name: input\n        type: record\n    returns: record\n    steps: []\n",
        VALID_EXTRACTOR
    );
    let result = ConstraintEnforcer::default().validate_code(&source);
    assert!(result.has_rule("interface.duplicate_operation"));
}

// =============================================================================
// validate_file
// =============================================================================

#[test]
fn test_validate_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("extractor.yaml");
    fs::write(&path, VALID_EXTRACTOR).unwrap();

    let result = ConstraintEnforcer::default().validate_file(&path).unwrap();
    assert!(result.valid);
}

#[test]
fn test_validate_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = ConstraintEnforcer::default()
        .validate_file(temp.path().join("absent.yaml"))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::FileNotFound(_)));
}

#[cfg(unix)]
#[test]
fn test_validate_unreadable_file() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("locked.yaml");
    fs::write(&path, VALID_EXTRACTOR).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores file modes
    if fs::read_to_string(&path).is_ok() {
        return;
    }
    let err = ConstraintEnforcer::default().validate_file(&path).unwrap_err();
    assert!(matches!(err, ValidatorError::PermissionDenied(_)));
}

#[test]
fn test_result_serializes() {
    let result = ConstraintEnforcer::default().validate_code("extractor: [");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["valid"], serde_json::json!(false));
    assert_eq!(json["violations"][0]["severity"], serde_json::json!("error"));
}
