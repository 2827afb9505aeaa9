//! Unit tests for the shared data model
//!
//! Covers examples, record paths, transformations and the extractor AST helpers

use exforge_core::ast::*;
use exforge_core::types::record::{flatten, get_path, set_path};
use exforge_core::*;
use serde_json::json;

// =============================================================================
// Example Tests
// =============================================================================

#[test]
fn test_example_accessors() {
    let example = Example::new(json!({"name": "Ada"}), json!({"fullName": "Ada"})).unwrap();
    assert_eq!(example.input()["name"], json!("Ada"));
    assert_eq!(example.output()["fullName"], json!("Ada"));
}

#[test]
fn test_example_rejects_scalar_output() {
    let err = Example::new(json!({}), json!(42)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidExample(_)));
}

#[test]
fn test_examples_from_file() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("exforge-core-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("examples.json");
    std::fs::write(
        &path,
        r#"[{"input": {"age": "36"}, "output": {"age": 36}}]"#,
    )?;

    let examples = Example::load_json_file(&path)?;
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].output()["age"], json!(36));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_examples_missing_file() {
    let err = Example::load_json_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("cannot read"));
}

// =============================================================================
// Record Path Tests
// =============================================================================

#[test]
fn test_path_round_trip_through_flatten() {
    let record = json!({"user": {"name": "Ada", "address": {"city": "London"}}, "id": 7});
    let mut rebuilt = json!({});
    for (path, value) in flatten(&record) {
        set_path(&mut rebuilt, &path, value.clone());
    }
    assert_eq!(rebuilt, record);
    assert_eq!(get_path(&rebuilt, "user.address.city"), Some(&json!("London")));
}

// =============================================================================
// Transformation Tests
// =============================================================================

#[test]
fn test_scalar_priority_order() {
    let names: Vec<String> = Transformation::SCALAR_PRIORITY
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "identity",
            "trim",
            "lowercase",
            "uppercase",
            "to_integer",
            "to_float",
            "to_string",
            "to_boolean"
        ]
    );
}

#[test]
fn test_transformation_dsl_functions_exist() {
    for t in Transformation::SCALAR_PRIORITY.iter() {
        if let Some(name) = t.dsl_function() {
            assert!(functions::lookup(name).is_some(), "missing {}", name);
        }
    }
}

#[test]
fn test_pattern_builder() {
    let pattern = Pattern::new(
        PatternType::TypeCoercion,
        0.9,
        "age",
        "years",
        Transformation::ToInteger,
    )
    .with_examples(vec![(json!("36"), json!(36))]);
    assert_eq!(pattern.examples.len(), 1);
    assert!(pattern.transformation.is_coercion());
}

// =============================================================================
// AST Tests
// =============================================================================

#[test]
fn test_document_lookup() {
    let doc = ExtractorDocument {
        metadata: ExtractorMetadata {
            name: "person".into(),
            version: Some("1.0.0".into()),
            description: None,
            imports: vec![],
        },
        operations: vec![
            Operation::new(ENTRY_OPERATION)
                .public()
                .with_param("input", Some(RECORD_TYPE))
                .with_returns(RECORD_TYPE)
                .with_steps(vec![Step::Invoke {
                    operation: "helper".into(),
                    args: vec![ValueExpr::Path("input".into())],
                    into: None,
                }]),
            Operation::new("helper").with_param("rec", Some(RECORD_TYPE)),
        ],
    };

    assert!(doc.entry().unwrap().has_entry_signature());
    assert!(doc.operation("helper").is_some());
    assert_eq!(doc.invocations(), vec![("extract", "helper")]);
}

#[test]
fn test_operation_complexity_metrics() {
    let inner = Step::If {
        condition: Condition::Any(vec![
            Condition::Exists("input.a".into()),
            Condition::Missing("input.b".into()),
        ]),
        then: vec![],
        otherwise: vec![],
    };
    let op = Operation::new("extract").with_steps(vec![
        Step::ForEach {
            source: "input.items".into(),
            binding: "item".into(),
            into: "out".into(),
            steps: vec![inner.clone()],
        },
        inner,
    ]);
    assert_eq!(op.nesting_depth(), 2);
    assert_eq!(op.branch_count(), 2);
}
