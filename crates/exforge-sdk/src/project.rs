//! Project directory writer
//!
//! Files of one synthesized component are written as a unit into a project
//! directory. Drafts written during retries are replaced at commit; rollback
//! removes everything this run put on disk.

use crate::error::{ResourceError, SynthesisError};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const EXTRACTOR_FILE: &str = "extractor.yaml";
pub const DRAFT_FILE: &str = "extractor.draft.yaml";
pub const SCHEMA_FILE: &str = "schema.yaml";
pub const PLAN_FILE: &str = "plan.yaml";
pub const EXAMPLES_FILE: &str = "tests/examples.json";
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Contents written at commit, keyed by path relative to the project directory
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    files: Vec<(String, String)>,
}

impl ProjectFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((relative_path.into(), content.into()));
        self
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|(p, _)| p.as_str()).collect()
    }
}

/// Writes and, on failure, removes one run's project directory
#[derive(Debug)]
pub struct ProjectWriter {
    root: PathBuf,
    /// Directory did not exist before this run
    created_by_run: bool,
    written: Vec<PathBuf>,
    /// Directories created by this run, outermost first
    created_dirs: Vec<PathBuf>,
}

impl ProjectWriter {
    /// Claim `root` for a run
    ///
    /// An existing directory is an input error unless `overwrite_existing`
    /// is set. Nothing is created until the first write.
    pub fn prepare(root: impl Into<PathBuf>, overwrite_existing: bool) -> Result<Self, SynthesisError> {
        let root = root.into();
        let exists = root.exists();
        if exists && !overwrite_existing {
            return Err(SynthesisError::ProjectExists(root));
        }
        Ok(Self {
            root,
            created_by_run: !exists,
            written: Vec::new(),
            created_dirs: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    async fn write(&mut self, relative: &str, content: &str) -> Result<(), ResourceError> {
        let path = self.path_of(relative);
        if let Some(parent) = path.parent() {
            let missing: Vec<PathBuf> = parent
                .ancestors()
                .take_while(|dir| !dir.exists())
                .map(Path::to_path_buf)
                .collect();
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ResourceError::io(parent, e))?;
            self.created_dirs.extend(missing.into_iter().rev());
        }
        fs::write(&path, content)
            .await
            .map_err(|e| ResourceError::io(&path, e))?;
        if !self.written.contains(&path) {
            self.written.push(path);
        }
        Ok(())
    }

    /// Write the candidate of the current attempt, replacing any earlier draft
    pub async fn write_draft(&mut self, source: &str) -> Result<(), ResourceError> {
        self.write(DRAFT_FILE, source).await
    }

    /// Write every file of the component and drop the draft
    pub async fn commit(&mut self, files: &ProjectFiles) -> Result<(), ResourceError> {
        for (relative, content) in &files.files {
            self.write(relative, content).await?;
        }

        let draft = self.path_of(DRAFT_FILE);
        match fs::remove_file(&draft).await {
            Ok(()) => self.written.retain(|p| p != &draft),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ResourceError::io(&draft, e)),
        }
        tracing::info!(dir = %self.root.display(), files = files.files.len(), "project committed");
        Ok(())
    }

    /// Remove what this run wrote
    ///
    /// A directory created by the run is removed entirely; in a pre-existing
    /// directory only the files written by the run are removed. Directories
    /// the run created along the way, parents included, are removed when
    /// they are left empty.
    pub async fn rollback(&mut self) -> Result<(), ResourceError> {
        if self.created_by_run {
            match fs::remove_dir_all(&self.root).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ResourceError::io(&self.root, e)),
            }
        } else {
            for path in &self.written {
                match fs::remove_file(path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(ResourceError::io(path, e)),
                }
            }
        }

        // innermost first; a directory that gained foreign entries stays
        for dir in self.created_dirs.iter().rev() {
            match fs::remove_dir(dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    if !is_empty_dir(dir).await {
                        continue;
                    }
                    return Err(ResourceError::io(dir, e));
                }
            }
        }
        self.created_dirs.clear();
        self.written.clear();
        tracing::info!(dir = %self.root.display(), "project rolled back");
        Ok(())
    }
}

async fn is_empty_dir(dir: &Path) -> bool {
    match fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_directory_rejected() {
        let temp = TempDir::new().unwrap();
        let err = ProjectWriter::prepare(temp.path(), false).unwrap_err();
        assert!(matches!(err, SynthesisError::ProjectExists(_)));
        assert!(ProjectWriter::prepare(temp.path(), true).is_ok());
    }

    #[tokio::test]
    async fn test_commit_replaces_draft() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("person");
        let mut writer = ProjectWriter::prepare(&root, false).unwrap();

        writer.write_draft("first").await.unwrap();
        writer.write_draft("second").await.unwrap();
        assert_eq!(std::fs::read_to_string(root.join(DRAFT_FILE)).unwrap(), "second");

        let files = ProjectFiles::new()
            .with_file(EXTRACTOR_FILE, "final")
            .with_file(EXAMPLES_FILE, "[]");
        writer.commit(&files).await.unwrap();

        assert!(!root.join(DRAFT_FILE).exists());
        assert_eq!(std::fs::read_to_string(root.join(EXTRACTOR_FILE)).unwrap(), "final");
        assert!(root.join("tests/examples.json").exists());
    }

    #[tokio::test]
    async fn test_rollback_removes_created_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("person");
        let mut writer = ProjectWriter::prepare(&root, false).unwrap();
        writer.write_draft("draft").await.unwrap();

        writer.rollback().await.unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_rollback_keeps_foreign_files() {
        let temp = TempDir::new().unwrap();
        let keep = temp.path().join("README.md");
        std::fs::write(&keep, "keep me").unwrap();

        let mut writer = ProjectWriter::prepare(temp.path(), true).unwrap();
        writer.write_draft("draft").await.unwrap();
        writer.rollback().await.unwrap();

        assert!(keep.exists());
        assert!(!temp.path().join(DRAFT_FILE).exists());
    }

    #[tokio::test]
    async fn test_rollback_removes_created_subdirectories() {
        let temp = TempDir::new().unwrap();
        let keep = temp.path().join("README.md");
        std::fs::write(&keep, "keep me").unwrap();

        let mut writer = ProjectWriter::prepare(temp.path(), true).unwrap();
        let files = ProjectFiles::new()
            .with_file(EXTRACTOR_FILE, "final")
            .with_file(EXAMPLES_FILE, "[]");
        writer.commit(&files).await.unwrap();
        assert!(temp.path().join("tests").is_dir());

        writer.rollback().await.unwrap();
        assert!(!temp.path().join("tests").exists());
        assert!(!temp.path().join(EXTRACTOR_FILE).exists());
        assert!(keep.exists());
    }

    #[tokio::test]
    async fn test_rollback_removes_created_parents() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("workspace/components/person");
        let mut writer = ProjectWriter::prepare(&root, false).unwrap();
        writer.write_draft("draft").await.unwrap();
        assert!(root.is_dir());

        writer.rollback().await.unwrap();
        assert!(!temp.path().join("workspace").exists());
        assert!(temp.path().exists());
    }

    #[tokio::test]
    async fn test_rollback_keeps_directory_with_foreign_entries() {
        let temp = TempDir::new().unwrap();
        let mut writer = ProjectWriter::prepare(temp.path(), true).unwrap();
        writer
            .commit(&ProjectFiles::new().with_file(EXAMPLES_FILE, "[]"))
            .await
            .unwrap();
        std::fs::write(temp.path().join("tests/notes.txt"), "mine").unwrap();

        writer.rollback().await.unwrap();
        assert!(temp.path().join("tests/notes.txt").exists());
        assert!(!temp.path().join(EXAMPLES_FILE).exists());
    }

    #[tokio::test]
    async fn test_rollback_without_writes() {
        let temp = TempDir::new().unwrap();
        let mut writer = ProjectWriter::prepare(temp.path().join("never"), false).unwrap();
        assert!(writer.rollback().await.is_ok());
    }
}
