//! End-to-end synthesis example
//!
//! This example demonstrates:
//! - Running a synthesis against a scripted model
//! - Retrying after a rejected candidate
//! - Registering the committed extractor and running it
//!
//! Output is written under `target/demos/`.

use exforge_core::{Example, Extractor, FieldType, SchemaField, TargetSchema};
use exforge_llm::provider::{MockProvider, MockReply};
use exforge_sdk::{
    open_registry, telemetry, CancellationToken, OutputOptions, RegistrySettings,
    SynthesisConfig, SynthesisRequest, Synthesizer, Version,
};
use serde_json::json;
use std::sync::Arc;

const PLAN: &str = r#"```yaml
plan:
  fields:
    - target: fullName
      sources: [first, last]
      function: text.join
    - target: age
      sources: [age]
      function: coerce.to_integer
    - target: email
      sources: [contact.email]
      function: text.lower
```"#;

// no documentation and no entry operation: rejected on the first attempt
const FIRST_CANDIDATE: &str = r#"```yaml
extractor:
  name: person_extractor
operations:
  - name: build
    params: [input]
    steps:
      - set: fullName
        call: text.join
        args: [" ", input.first, input.last]
```"#;

const SECOND_CANDIDATE: &str = r#"```yaml
extractor:
  name: person_extractor
  version: "1.0.0"
  description: Builds a person record from a CRM contact
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
      - set: email
        call: text.lower
        args: [input.contact.email]
```"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing("info", false)?;
    println!("=== Synthesis Example ===\n");

    let mut config = SynthesisConfig::default();
    config.registry = RegistrySettings {
        path: Some("target/demos/registry.yaml".into()),
    };

    let registry = open_registry(&config.registry)
        .await?
        .ok_or("registry path not configured")?;

    let model = Arc::new(MockProvider::scripted(vec![
        MockReply::Content(PLAN.to_string()),
        MockReply::Content(FIRST_CANDIDATE.to_string()),
        MockReply::Content(SECOND_CANDIDATE.to_string()),
    ]));
    let synthesizer = Synthesizer::new(config, model)?.with_registry(registry.clone());

    let examples = Example::load_json_file("demos/data/person_examples.json")?;
    let schema = TargetSchema::new("person")
        .with_field(SchemaField::new("fullName", FieldType::String))
        .with_field(SchemaField::new("age", FieldType::Integer))
        .with_field(SchemaField::new("email", FieldType::String));

    let version: Version = "1.0.0".parse()?;
    let request = SynthesisRequest::new("person_extractor", examples, schema).with_output(
        OutputOptions::write_to("target/demos/person_extractor")
            .overwrite(true)
            .register_as(version.clone(), ["crm", "demo"]),
    );

    let outcome = synthesizer
        .synthesize(&request, &CancellationToken::new())
        .await?;
    println!("{}\n", outcome.report);

    if !outcome.is_success() {
        return Ok(());
    }

    let extractor = registry.resolve("person_extractor", Some(&version)).await?;
    let record = json!({
        "first": "Edsger",
        "last": "Dijkstra",
        "age": "72",
        "contact": { "email": "EWD@Example.org" }
    });
    let extracted = extractor.extract(&record)?;

    println!("Input:  {}", record);
    println!("Output: {}", extracted);

    Ok(())
}
