//! Extractor registry service

use crate::error::{RegistryError, RegistryResult, ResolutionError};
use crate::loader::ImplementationLoader;
use crate::models::{RegistrationOutcome, RegistryEntry, Version};
use crate::store::RegistryStore;
use exforge_core::Extractor;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type EntryKey = (String, Version);

/// Versioned catalogue of extractors with lazy, cached instantiation
///
/// Mutations are flushed to the store before they return. Reads take a
/// shared lock, so concurrent resolution does not serialize.
pub struct ExtractorRegistry {
    store: Arc<dyn RegistryStore>,
    loader: ImplementationLoader,
    entries: RwLock<BTreeMap<EntryKey, RegistryEntry>>,
    instances: RwLock<HashMap<EntryKey, Arc<dyn Extractor>>>,
}

impl ExtractorRegistry {
    /// Load all entries from `store`
    pub async fn open(
        store: Arc<dyn RegistryStore>,
        loader: ImplementationLoader,
    ) -> RegistryResult<Self> {
        let loaded = store.load().await?;
        let mut entries = BTreeMap::new();
        for entry in loaded {
            entry.validate()?;
            if let Some(dup) = entries.insert(entry.key(), entry) {
                tracing::warn!(
                    name = %dup.name,
                    version = %dup.version,
                    "duplicate registry entry, keeping the later one"
                );
            }
        }

        tracing::info!(
            store = %store.describe(),
            entries = entries.len(),
            "opened extractor registry"
        );
        Ok(Self {
            store,
            loader,
            entries: RwLock::new(entries),
            instances: RwLock::new(HashMap::new()),
        })
    }

    /// Insert or replace the entry for `(name, version)`
    ///
    /// Only metadata is recorded; the implementation is not read until it is
    /// first resolved. On a store failure the in-memory state is restored.
    pub async fn register(&self, entry: RegistryEntry) -> RegistryResult<RegistrationOutcome> {
        entry.validate()?;
        let key = entry.key();

        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.clone(), entry);
        let snapshot: Vec<RegistryEntry> = entries.values().cloned().collect();

        if let Err(e) = self.store.save(&snapshot).await {
            match &previous {
                Some(prev) => entries.insert(key, prev.clone()),
                None => entries.remove(&key),
            };
            return Err(e);
        }
        drop(entries);

        self.instances.write().await.remove(&key);

        let (name, version) = key;
        let outcome = match previous {
            Some(previous) => {
                tracing::info!(%name, %version, "updated registry entry");
                RegistrationOutcome::Updated { previous }
            }
            None => {
                tracing::info!(%name, %version, "registered extractor");
                RegistrationOutcome::Inserted
            }
        };
        Ok(outcome)
    }

    /// Remove the entry for `(name, version)`, returning it
    pub async fn unregister(&self, name: &str, version: &Version) -> RegistryResult<RegistryEntry> {
        let key = (name.to_string(), version.clone());

        let mut entries = self.entries.write().await;
        let removed = entries.remove(&key).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            version: version.to_string(),
        })?;
        let snapshot: Vec<RegistryEntry> = entries.values().cloned().collect();

        if let Err(e) = self.store.save(&snapshot).await {
            entries.insert(key, removed);
            return Err(e);
        }
        drop(entries);

        self.instances.write().await.remove(&key);
        tracing::info!(%name, %version, "unregistered extractor");
        Ok(removed)
    }

    /// Entry for `name`: the given version, or the latest when `None`
    pub async fn get(&self, name: &str, version: Option<&Version>) -> Option<RegistryEntry> {
        let entries = self.entries.read().await;
        match version {
            Some(v) => entries.get(&(name.to_string(), v.clone())).cloned(),
            None => entries
                .values()
                .filter(|e| e.name == name)
                .max_by(|a, b| a.version.cmp(&b.version))
                .cloned(),
        }
    }

    /// Instantiate (or fetch the cached instance of) an extractor
    pub async fn resolve(
        &self,
        name: &str,
        version: Option<&Version>,
    ) -> Result<Arc<dyn Extractor>, ResolutionError> {
        let entry = self
            .get(name, version)
            .await
            .ok_or_else(|| ResolutionError::NotFound {
                name: name.to_string(),
                version: version.map(|v| v.to_string()),
            })?;
        let key = entry.key();

        if let Some(cached) = self.instances.read().await.get(&key) {
            return Ok(Arc::clone(cached));
        }

        let loaded = self.loader.load(&entry).await?;

        // entry replaced while loading: hand out the instance without caching it
        let entries = self.entries.read().await;
        if entries.get(&key) != Some(&entry) {
            return Ok(loaded);
        }
        let mut instances = self.instances.write().await;
        let instance = instances.entry(key).or_insert(loaded);
        tracing::debug!(name = %entry.name, version = %entry.version, "resolved extractor");
        Ok(Arc::clone(instance))
    }

    /// Entries carrying every tag in `filter_tags`, by name ascending then version descending
    pub async fn list(&self, filter_tags: Option<&[&str]>) -> Vec<RegistryEntry> {
        let entries = self.entries.read().await;
        let mut matching: Vec<RegistryEntry> = entries
            .values()
            .filter(|e| filter_tags.map_or(true, |tags| e.has_all_tags(tags)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| b.version.cmp(&a.version)));
        matching
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn loader(&self) -> &ImplementationLoader {
        &self.loader
    }
}
