//! Registry of synthesized extractors
//!
//! Entries are metadata records keyed by `(name, version)`. Implementations
//! are loaded lazily on first resolution and cached until the entry changes.
//!
//! # Quick Start
//!
//! ```no_run
//! use exforge_core::Extractor;
//! use exforge_registry::{ExtractorRegistry, ImplementationLoader, RegistryEntry, YamlFileStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(YamlFileStore::new("registry/registry.yaml")?);
//! let loader = ImplementationLoader::new("registry");
//! let registry = ExtractorRegistry::open(store, loader).await?;
//!
//! let entry = RegistryEntry::new("person", "1.0.0".parse()?, "person/extractor.yaml");
//! registry.register(entry).await?;
//!
//! let extractor = registry.resolve("person", None).await?;
//! let output = extractor.extract(&serde_json::json!({"name": "Ada"}))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ExtractorRegistry
//!   ├── RegistryStore        (persistence: YamlFileStore, InMemoryStore)
//!   └── ImplementationLoader (builtin:<id> factories, DSL files)
//! ```

pub mod error;
pub mod loader;
pub mod models;
pub mod registry;
pub mod store;

pub use error::{RegistryError, RegistryResult, ResolutionError};
pub use loader::{ExtractorFactory, ImplementationLoader, BUILTIN_PREFIX};
pub use models::{RegistrationOutcome, RegistryEntry, Version};
pub use registry::ExtractorRegistry;
pub use store::{InMemoryStore, RegistryStore, YamlFileStore};
