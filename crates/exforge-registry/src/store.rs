//! Registry persistence backends

use crate::error::{RegistryError, RegistryResult};
use crate::models::{RegistryEntry, RegistryFile};
use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tokio::sync::Mutex;

/// Persistence for registry entries
///
/// The registry keeps the authoritative copy in memory; a store only loads the
/// full entry list at startup and receives a full snapshot after each mutation.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn load(&self) -> RegistryResult<Vec<RegistryEntry>>;

    async fn save(&self, entries: &[RegistryEntry]) -> RegistryResult<()>;

    /// Human-readable location, used in log output
    fn describe(&self) -> String;
}

/// Stores entries in a single human-diffable `registry.yaml`
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so readers never observe a partially written registry.
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let path = path.as_ref();
        let abs_path = path
            .absolutize()
            .map_err(|_| RegistryError::InvalidPath {
                path: path.to_path_buf(),
            })?
            .to_path_buf();
        Ok(Self { path: abs_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "registry.yaml".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RegistryStore for YamlFileStore {
    async fn load(&self) -> RegistryResult<Vec<RegistryEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "registry file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RegistryError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: RegistryFile = serde_yaml::from_str(&content)?;
        Ok(file.entries)
    }

    async fn save(&self, entries: &[RegistryEntry]) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RegistryError::io(parent, e))?;
        }

        let file = RegistryFile {
            entries: entries.to_vec(),
        };
        let content = serde_yaml::to_string(&file)?;

        let temp = self.temp_path();
        fs::write(&temp, content)
            .await
            .map_err(|e| RegistryError::io(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| RegistryError::io(&self.path, e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps entries in memory only
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<Vec<RegistryEntry>>,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`
    pub fn with_entries(entries: Vec<RegistryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of snapshots written so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<RegistryEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl RegistryStore for InMemoryStore {
    async fn load(&self) -> RegistryResult<Vec<RegistryEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, entries: &[RegistryEntry]) -> RegistryResult<()> {
        *self.entries.lock().await = entries.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, version: &str) -> RegistryEntry {
        RegistryEntry::new(name, version.parse().unwrap(), format!("{}.yaml", name))
    }

    #[tokio::test]
    async fn test_yaml_store_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = YamlFileStore::new(temp.path().join("registry.yaml")).unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_yaml_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/registry.yaml");
        let store = YamlFileStore::new(&path).unwrap();

        let entries = vec![entry("a", "1.0.0"), entry("b", "2.1")];
        store.save(&entries).await.unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), entries);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("name: a"));
    }

    #[tokio::test]
    async fn test_yaml_store_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.yaml");
        std::fs::write(&path, "entries: [ {name: x, version: not-a-version} ]").unwrap();
        let store = YamlFileStore::new(&path).unwrap();
        assert!(matches!(
            store.load().await,
            Err(RegistryError::YamlParse(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store_counts_saves() {
        let store = InMemoryStore::new();
        store.save(&[entry("a", "1")]).await.unwrap();
        store.save(&[]).await.unwrap();
        assert_eq!(store.save_count(), 2);
        assert!(store.load().await.unwrap().is_empty());
    }
}
