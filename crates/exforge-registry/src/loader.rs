//! Implementation loading
//!
//! Maps an entry's `implementation_path` to a live `Extractor`:
//! `builtin:<id>` selects a natively registered factory, anything else is an
//! extractor document on disk.

use crate::error::ResolutionError;
use crate::models::RegistryEntry;
use exforge_core::Extractor;
use exforge_runtime::{DslExtractor, RuntimeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Prefix selecting a native implementation
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Factory for a natively implemented extractor
pub type ExtractorFactory = Arc<dyn Fn() -> Arc<dyn Extractor> + Send + Sync>;

/// Loads extractor implementations for registry entries
#[derive(Clone)]
pub struct ImplementationLoader {
    base_dir: PathBuf,
    builtins: HashMap<String, ExtractorFactory>,
}

impl ImplementationLoader {
    /// Relative document paths resolve against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            builtins: HashMap::new(),
        }
    }

    pub fn with_builtin<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Extractor> + Send + Sync + 'static,
    {
        self.register_builtin(id, factory);
        self
    }

    pub fn register_builtin<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Extractor> + Send + Sync + 'static,
    {
        self.builtins.insert(id.into(), Arc::new(factory));
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve_path(&self, implementation_path: &str) -> PathBuf {
        let path = Path::new(implementation_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub async fn load(&self, entry: &RegistryEntry) -> Result<Arc<dyn Extractor>, ResolutionError> {
        let load_failure = |message: String| ResolutionError::LoadFailure {
            name: entry.name.clone(),
            version: entry.version.to_string(),
            message,
        };

        if let Some(id) = entry.implementation_path.strip_prefix(BUILTIN_PREFIX) {
            let factory = self
                .builtins
                .get(id)
                .ok_or_else(|| load_failure(format!("no builtin implementation '{}'", id)))?;
            return Ok(factory());
        }

        let path = self.resolve_path(&entry.implementation_path);
        let source = fs::read_to_string(&path)
            .await
            .map_err(|e| load_failure(format!("cannot read {}: {}", path.display(), e)))?;

        let extractor = DslExtractor::from_source(&source).map_err(|e| match e {
            RuntimeError::Parse(parse) => load_failure(parse.to_string()),
            other => ResolutionError::ContractMismatch {
                name: entry.name.clone(),
                version: entry.version.to_string(),
                message: other.to_string(),
            },
        })?;

        if extractor.name() != entry.name {
            tracing::warn!(
                entry = %entry.name,
                document = %extractor.name(),
                "extractor document name differs from registered name"
            );
        }
        tracing::debug!(
            name = %entry.name,
            version = %entry.version,
            path = %path.display(),
            "loaded extractor document"
        );
        Ok(Arc::new(extractor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exforge_core::Record;

    struct Identity;

    impl Extractor for Identity {
        fn name(&self) -> &str {
            "identity"
        }

        fn extract(&self, input: &Record) -> exforge_core::Result<Record> {
            Ok(input.clone())
        }
    }

    #[tokio::test]
    async fn test_builtin_factory() {
        let loader = ImplementationLoader::new("/tmp")
            .with_builtin("identity", || Arc::new(Identity) as Arc<dyn Extractor>);
        let entry = RegistryEntry::new("id", "1".parse().unwrap(), "builtin:identity");
        let extractor = loader.load(&entry).await.unwrap();
        assert_eq!(extractor.name(), "identity");
    }

    #[tokio::test]
    async fn test_unknown_builtin() {
        let loader = ImplementationLoader::new("/tmp");
        let entry = RegistryEntry::new("id", "1".parse().unwrap(), "builtin:missing");
        assert!(matches!(
            loader.load(&entry).await,
            Err(ResolutionError::LoadFailure { .. })
        ));
    }

    #[test]
    fn test_resolve_relative_path() {
        let loader = ImplementationLoader::new("/srv/registry");
        assert_eq!(
            loader.resolve_path("person/extractor.yaml"),
            PathBuf::from("/srv/registry/person/extractor.yaml")
        );
        assert_eq!(
            loader.resolve_path("/abs/extractor.yaml"),
            PathBuf::from("/abs/extractor.yaml")
        );
    }
}
