//! Unit tests for extractor execution

use exforge_core::Extractor;
use exforge_runtime::*;
use serde_json::{json, Value};
use std::sync::Arc;

const CUSTOMER_EXTRACTOR: &str = r#"
extractor:
  name: customer_extractor
  version: "1.2.0"
  description: Normalizes customer records
  imports: [text, coerce, value]

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
      - if:
          all:
            - exists: input.email
            - not_equals: [input.email, ""]
        then:
          - set: contact.email
            call: text.lower
            args: [input.email]
        else:
          - set: contact.email
            value: null
      - for_each: input.orders
        as: order
        into: orders
        steps:
          - set: id
            from: order.id
          - set: total
            call: value.default
            args: [{call: coerce.to_float, args: [order.total]}, 0]
      - invoke: address
        args: [input]
        into: address

  - name: address
    description: Builds the address block
    params:
      - name: source
        type: record
    returns: record
    steps:
      - set: city
        call: text.trim
        args: [source.city]
"#;

fn customer() -> DslExtractor {
    DslExtractor::from_source(CUSTOMER_EXTRACTOR).unwrap()
}

// =============================================================================
// Full Document
// =============================================================================

#[test]
fn test_full_extraction() {
    let input = json!({
        "first": "Ada",
        "last": "Lovelace",
        "age": "36",
        "email": "ADA@EXAMPLE.ORG",
        "city": "  London ",
        "orders": [{"id": 1, "total": "9.5"}, {"id": 2}]
    });

    let out = customer().extract(&input).unwrap();
    assert_eq!(
        out,
        json!({
            "fullName": "Ada Lovelace",
            "age": 36,
            "contact": {"email": "ada@example.org"},
            "orders": [{"id": 1, "total": 9.5}, {"id": 2, "total": 0}],
            "address": {"city": "London"}
        })
    );
}

#[test]
fn test_extract_through_trait() -> anyhow::Result<()> {
    let extractor: Arc<dyn Extractor> = Arc::new(customer());
    let output = extractor.extract(&json!({ "first": "Alan", "last": "Turing", "age": 41 }))?;

    assert_eq!(extractor.name(), "customer_extractor");
    assert_eq!(output["fullName"], "Alan Turing");
    assert_eq!(output["age"], 41);
    assert_eq!(output["orders"], json!([]));
    Ok(())
}

#[test]
fn test_missing_fields_yield_null() {
    let out = customer().extract(&json!({"first": "Ada"})).unwrap();
    assert_eq!(out["fullName"], json!("Ada"));
    assert_eq!(out["age"], Value::Null);
    assert_eq!(out["contact"]["email"], Value::Null);
    assert_eq!(out["orders"], json!([]));
    assert_eq!(out["address"], json!({"city": null}));
}

#[test]
fn test_else_branch_on_empty_email() {
    let out = customer().extract(&json!({"email": ""})).unwrap();
    assert_eq!(out["contact"]["email"], Value::Null);
}

#[test]
fn test_function_error_surfaces() {
    let err = customer().run(&json!({"age": "thirty"})).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeError { .. }));
    assert!(err.to_string().contains("coerce.to_integer"));

    let core_err = customer().extract(&json!({"age": "thirty"})).unwrap_err();
    assert!(core_err.to_string().contains("Extraction failed"));
}

#[test]
fn test_for_each_over_non_list() {
    let err = customer().run(&json!({"orders": "none"})).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeError { .. }));
}

// =============================================================================
// Invocation
// =============================================================================

#[test]
fn test_invoke_without_into_merges() {
    let source = r#"
extractor:
  name: merge
  imports: [text]
operations:
  - name: extract
    visibility: public
    params:
      - name: input
        type: record
    returns: record
    steps:
      - set: kept
        value: true
      - invoke: names
        args: [input.person]
  - name: names
    params: [person]
    steps:
      - set: first
        call: text.trim
        args: [person.first]
"#;
    let extractor = DslExtractor::from_source(source).unwrap();
    let out = extractor
        .extract(&json!({"person": {"first": " Grace "}}))
        .unwrap();
    assert_eq!(out, json!({"kept": true, "first": "Grace"}));
}

#[test]
fn test_unknown_operation_rejected() {
    let source = CUSTOMER_EXTRACTOR.replace("invoke: address", "invoke: location");
    assert!(matches!(
        DslExtractor::from_source(&source),
        Err(RuntimeError::UnknownOperation(name)) if name == "location"
    ));
}

#[test]
fn test_invoke_arity_checked() {
    let source = CUSTOMER_EXTRACTOR.replace("args: [input]\n", "args: [input, input]\n");
    assert!(matches!(
        DslExtractor::from_source(&source),
        Err(RuntimeError::ArityMismatch { .. })
    ));
}

#[test]
fn test_unbounded_recursion_stops() {
    let source = r#"
extractor:
  name: loop
operations:
  - name: extract
    visibility: public
    params:
      - name: input
        type: record
    returns: record
    steps:
      - invoke: again
        args: [input]
  - name: again
    params: [x]
    steps:
      - invoke: again
        args: [x]
"#;
    let extractor = DslExtractor::from_source(source).unwrap();
    assert!(matches!(
        extractor.run(&json!({})),
        Err(RuntimeError::CallDepthExceeded(MAX_CALL_DEPTH))
    ));
}

#[test]
fn test_shared_across_threads() {
    let extractor: Arc<dyn Extractor> = Arc::new(customer());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let extractor = Arc::clone(&extractor);
            std::thread::spawn(move || {
                extractor
                    .extract(&json!({"first": "User", "last": i.to_string()}))
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().unwrap();
        assert_eq!(out["fullName"], json!(format!("User {}", i)));
    }
}
