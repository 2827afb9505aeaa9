//! Unit tests for ExtractorRegistry
//!
//! Covers registration, resolution, listing and persistence.

use exforge_core::{Extractor, Record};
use exforge_registry::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

const PERSON_EXTRACTOR: &str = r#"
extractor:
  name: person
  version: "1.0.0"
  description: Builds a person record
  imports: [text]
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
"#;

struct Constant;

impl Extractor for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn extract(&self, _input: &Record) -> exforge_core::Result<Record> {
        Ok(json!({"constant": true}))
    }
}

fn v(s: &str) -> Version {
    s.parse().unwrap()
}

/// Helper creating a registry over a temp directory holding one extractor document
async fn create_test_registry() -> (TempDir, ExtractorRegistry) {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("person")).await.unwrap();
    fs::write(temp_dir.path().join("person/extractor.yaml"), PERSON_EXTRACTOR)
        .await
        .unwrap();

    let store = Arc::new(YamlFileStore::new(temp_dir.path().join("registry.yaml")).unwrap());
    let loader = ImplementationLoader::new(temp_dir.path())
        .with_builtin("constant", || Arc::new(Constant) as Arc<dyn Extractor>);
    let registry = ExtractorRegistry::open(store, loader).await.unwrap();
    (temp_dir, registry)
}

// =============================================================================
// Register / Resolve
// =============================================================================

#[tokio::test]
async fn test_register_then_resolve() {
    let (_temp, registry) = create_test_registry().await;

    let outcome = registry
        .register(RegistryEntry::new("person", v("1.0.0"), "person/extractor.yaml"))
        .await
        .unwrap();
    assert_eq!(outcome, RegistrationOutcome::Inserted);

    let extractor = registry.resolve("person", None).await.unwrap();
    assert_eq!(extractor.name(), "person");
    let out = extractor
        .extract(&json!({"first": "Ada", "last": "Lovelace"}))
        .unwrap();
    assert_eq!(out, json!({"fullName": "Ada Lovelace"}));
}

#[tokio::test]
async fn test_resolve_caches_instance() {
    let (_temp, registry) = create_test_registry().await;
    registry
        .register(RegistryEntry::new("person", v("1.0.0"), "person/extractor.yaml"))
        .await
        .unwrap();

    let first = registry.resolve("person", None).await.unwrap();
    let second = registry.resolve("person", Some(&v("1.0.0"))).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_register_is_metadata_only() {
    let (_temp, registry) = create_test_registry().await;

    // registering a path that does not exist succeeds; resolution reports it
    registry
        .register(RegistryEntry::new("ghost", v("1"), "ghost/extractor.yaml"))
        .await
        .unwrap();

    let err = registry
        .resolve("ghost", None)
        .await
        .err()
        .expect("resolution should fail");
    assert!(matches!(err, ResolutionError::LoadFailure { .. }));
}

#[tokio::test]
async fn test_resolve_unknown_name() {
    let (_temp, registry) = create_test_registry().await;
    let err = registry
        .resolve("nobody", None)
        .await
        .err()
        .expect("resolution should fail");
    assert_eq!(
        err,
        ResolutionError::NotFound {
            name: "nobody".to_string(),
            version: None
        }
    );

    registry
        .register(RegistryEntry::new("person", v("1.0.0"), "person/extractor.yaml"))
        .await
        .unwrap();
    let err = registry
        .resolve("person", Some(&v("9")))
        .await
        .err()
        .expect("resolution should fail");
    assert!(matches!(err, ResolutionError::NotFound { version: Some(_), .. }));
}

#[tokio::test]
async fn test_contract_mismatch() {
    let (temp, registry) = create_test_registry().await;
    let broken = PERSON_EXTRACTOR.replace("returns: record", "returns: string");
    fs::write(temp.path().join("broken.yaml"), broken).await.unwrap();

    registry
        .register(RegistryEntry::new("broken", v("1"), "broken.yaml"))
        .await
        .unwrap();
    let err = registry
        .resolve("broken", None)
        .await
        .err()
        .expect("resolution should fail");
    assert!(matches!(err, ResolutionError::ContractMismatch { .. }));
}

#[tokio::test]
async fn test_unparsable_document_is_load_failure() {
    let (temp, registry) = create_test_registry().await;
    fs::write(temp.path().join("bad.yaml"), "extractor: [").await.unwrap();

    registry
        .register(RegistryEntry::new("bad", v("1"), "bad.yaml"))
        .await
        .unwrap();
    assert!(matches!(
        registry.resolve("bad", None).await,
        Err(ResolutionError::LoadFailure { .. })
    ));
}

#[tokio::test]
async fn test_builtin_resolution() {
    let (_temp, registry) = create_test_registry().await;
    registry
        .register(RegistryEntry::new("constant", v("1"), "builtin:constant"))
        .await
        .unwrap();

    let extractor = registry.resolve("constant", None).await.unwrap();
    assert_eq!(extractor.extract(&json!({})).unwrap(), json!({"constant": true}));
}

// =============================================================================
// Versions
// =============================================================================

#[tokio::test]
async fn test_latest_version_wins() {
    let (_temp, registry) = create_test_registry().await;
    for version in ["1.2.0", "1.10.0", "1.9.3"] {
        registry
            .register(RegistryEntry::new("person", v(version), "person/extractor.yaml"))
            .await
            .unwrap();
    }

    let latest = registry.get("person", None).await.unwrap();
    assert_eq!(latest.version.to_string(), "1.10.0");
}

#[tokio::test]
async fn test_register_upserts_and_invalidates_cache() {
    let (_temp, registry) = create_test_registry().await;
    registry
        .register(RegistryEntry::new("person", v("1"), "person/extractor.yaml"))
        .await
        .unwrap();
    let first = registry.resolve("person", None).await.unwrap();

    let outcome = registry
        .register(RegistryEntry::new("person", v("1"), "builtin:constant"))
        .await
        .unwrap();
    match outcome {
        RegistrationOutcome::Updated { previous } => {
            assert_eq!(previous.implementation_path, "person/extractor.yaml")
        }
        other => panic!("expected update, got {:?}", other),
    }

    let second = registry.resolve("person", None).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.name(), "constant");
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn test_unregister() {
    let (_temp, registry) = create_test_registry().await;
    registry
        .register(RegistryEntry::new("person", v("1"), "person/extractor.yaml"))
        .await
        .unwrap();

    let removed = registry.unregister("person", &v("1")).await.unwrap();
    assert_eq!(removed.name, "person");
    assert!(registry.is_empty().await);

    assert!(matches!(
        registry.unregister("person", &v("1")).await,
        Err(RegistryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_invalid_entry_rejected() {
    let (_temp, registry) = create_test_registry().await;
    let entry = RegistryEntry::new("person", v("1"), "x.yaml").with_confidence(2.0);
    assert!(matches!(
        registry.register(entry).await,
        Err(RegistryError::InvalidEntry(_))
    ));
    assert!(registry.is_empty().await);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_filters_and_orders() {
    let store = Arc::new(InMemoryStore::new());
    let registry = ExtractorRegistry::open(store, ImplementationLoader::new("."))
        .await
        .unwrap();

    let entries = [
        ("orders", "1.0", vec!["crm"]),
        ("customer", "1.0", vec!["crm", "pii"]),
        ("customer", "2.0", vec!["crm", "pii"]),
        ("invoice", "1.0", vec!["billing"]),
    ];
    for (name, version, tags) in entries {
        registry
            .register(RegistryEntry::new(name, v(version), "builtin:x").with_tags(tags))
            .await
            .unwrap();
    }

    let all: Vec<(String, String)> = registry
        .list(None)
        .await
        .into_iter()
        .map(|e| (e.name, e.version.to_string()))
        .collect();
    assert_eq!(
        all,
        vec![
            ("customer".to_string(), "2.0".to_string()),
            ("customer".to_string(), "1.0".to_string()),
            ("invoice".to_string(), "1.0".to_string()),
            ("orders".to_string(), "1.0".to_string()),
        ]
    );

    let crm_pii = registry.list(Some(&["crm", "pii"][..])).await;
    assert_eq!(crm_pii.len(), 2);
    assert!(crm_pii.iter().all(|e| e.name == "customer"));

    assert!(registry.list(Some(&["crm", "billing"][..])).await.is_empty());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_entries_survive_reopen() {
    let (temp, registry) = create_test_registry().await;
    registry
        .register(
            RegistryEntry::new("person", v("1.0.0"), "person/extractor.yaml")
                .with_confidence(0.9)
                .with_example_count(3)
                .with_tags(["crm"]),
        )
        .await
        .unwrap();
    drop(registry);

    let store = Arc::new(YamlFileStore::new(temp.path().join("registry.yaml")).unwrap());
    let reopened = ExtractorRegistry::open(store, ImplementationLoader::new(temp.path()))
        .await
        .unwrap();
    let entry = reopened.get("person", None).await.unwrap();
    assert_eq!(entry.example_count, 3);
    assert_eq!(entry.tags, vec!["crm"]);

    let extractor = reopened.resolve("person", None).await.unwrap();
    assert_eq!(extractor.name(), "person");
}

#[tokio::test]
async fn test_every_mutation_flushes() {
    let store = Arc::new(InMemoryStore::new());
    let registry = ExtractorRegistry::open(store.clone(), ImplementationLoader::new("."))
        .await
        .unwrap();

    registry
        .register(RegistryEntry::new("a", v("1"), "builtin:a"))
        .await
        .unwrap();
    registry
        .register(RegistryEntry::new("a", v("2"), "builtin:a"))
        .await
        .unwrap();
    registry.unregister("a", &v("1")).await.unwrap();

    assert_eq!(store.save_count(), 3);
    let persisted = store.snapshot().await;
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].version, v("2"));
}

#[tokio::test]
async fn test_concurrent_resolution() {
    let (_temp, registry) = create_test_registry().await;
    registry
        .register(RegistryEntry::new("person", v("1"), "person/extractor.yaml"))
        .await
        .unwrap();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.resolve("person", None).await })
        })
        .collect();

    for handle in handles {
        let extractor = handle.await.unwrap().unwrap();
        assert_eq!(extractor.name(), "person");
    }
}
