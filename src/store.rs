//! Reference store: durable last-seen version metadata
//!
//! One YAML document maps dependency identifiers to their reference
//! snapshots. The store is loaded once at pass start, mutated in memory
//! as checks complete, and rewritten wholesale at pass end. The rewrite
//! goes through a temp file in the same directory followed by a rename,
//! so a crash mid-write cannot leave a truncated document behind.

use crate::domain::ReferenceSnapshot;
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// In-memory reference map bound to its backing document
#[derive(Debug)]
pub struct ReferenceStore {
    path: PathBuf,
    refs: BTreeMap<String, ReferenceSnapshot>,
}

impl ReferenceStore {
    /// Load the store from its backing document.
    ///
    /// A missing file yields an empty store (first-run bootstrap); an
    /// existing but unparseable file is fatal, since scanning against an
    /// unknown baseline risks duplicate notifications.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            debug!(path = %path.display(), "reference store absent, starting empty");
            return Ok(Self {
                path,
                refs: BTreeMap::new(),
            });
        }

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::read_error(path.clone(), e))?;

        // An empty document is a valid empty store
        let refs: BTreeMap<String, ReferenceSnapshot> = if raw.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(&raw)
                .map_err(|e| StoreError::unreadable(path.clone(), e.to_string()))?
        };

        debug!(path = %path.display(), entries = refs.len(), "reference store loaded");
        Ok(Self { path, refs })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current reference snapshot for a dependency. Unseen dependencies
    /// get an empty snapshot: their first observed version bootstraps the
    /// baseline rather than erroring.
    pub fn get(&self, dependency: &str) -> ReferenceSnapshot {
        self.refs.get(dependency).cloned().unwrap_or_default()
    }

    /// Whether the dependency has a recorded reference
    pub fn contains(&self, dependency: &str) -> bool {
        self.refs.contains_key(dependency)
    }

    /// Replace a dependency's snapshot in memory. Nothing reaches disk
    /// until `persist` runs.
    pub fn set(&mut self, dependency: impl Into<String>, snapshot: ReferenceSnapshot) {
        self.refs.insert(dependency.into(), snapshot);
    }

    /// Number of tracked dependencies
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// True when no dependency has a reference yet
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Rewrite the backing document atomically. Safe to call when nothing
    /// changed; the content is simply rewritten as-is.
    pub fn persist(&self) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(&self.refs)
            .map_err(|e| StoreError::write_error(self.path.clone(), e.to_string()))?;

        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir),
            None => tempfile::NamedTempFile::new_in("."),
        }
        .map_err(|e| StoreError::write_error(self.path.clone(), e.to_string()))?;

        tmp.write_all(yaml.as_bytes())
            .map_err(|e| StoreError::write_error(self.path.clone(), e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::write_error(self.path.clone(), e.to_string()))?;

        debug!(path = %self.path.display(), entries = self.refs.len(), "reference store persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("references.yml")
    }

    #[test]
    fn test_load_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::load(store_path(&dir)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_existing_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            store_path(&dir),
            "cfitsio:\n  version: 4.3.1\n  soname: '10'\noctocat/widgets:\n  version: 1.2.0\n",
        )
        .unwrap();

        let store = ReferenceStore::load(store_path(&dir)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("cfitsio").version(), Some("4.3.1"));
        assert_eq!(store.get("cfitsio").get("soname"), Some("10"));
        assert_eq!(store.get("octocat/widgets").version(), Some("1.2.0"));
    }

    #[test]
    fn test_load_unparseable_document_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "cfitsio: [unbalanced\n").unwrap();

        let err = ReferenceStore::load(store_path(&dir)).unwrap_err();
        assert!(matches!(err, StoreError::Unreadable { .. }));
    }

    #[test]
    fn test_load_empty_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "").unwrap();
        let store = ReferenceStore::load(store_path(&dir)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_unseen_dependency_gets_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::load(store_path(&dir)).unwrap();
        let snapshot = store.get("never-seen");
        assert!(snapshot.is_empty());
        assert!(!store.contains("never-seen"));
    }

    #[test]
    fn test_set_is_memory_only_until_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = ReferenceStore::load(store_path(&dir)).unwrap();
        store.set("cfitsio", [("version", "4.4.0")].into_iter().collect());

        // Nothing on disk yet
        assert!(!store_path(&dir).exists());

        store.persist().unwrap();
        let reloaded = ReferenceStore::load(store_path(&dir)).unwrap();
        assert_eq!(reloaded.get("cfitsio").version(), Some("4.4.0"));
    }

    #[test]
    fn test_persist_rewrites_wholesale() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "stale:\n  version: 0.1.0\n").unwrap();

        let mut store = ReferenceStore::load(store_path(&dir)).unwrap();
        store.set("fresh", [("version", "1.0")].into_iter().collect());
        store.persist().unwrap();

        let reloaded = ReferenceStore::load(store_path(&dir)).unwrap();
        // Prior entries survive the rewrite, new ones are added
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("stale").version(), Some("0.1.0"));
        assert_eq!(reloaded.get("fresh").version(), Some("1.0"));
    }

    #[test]
    fn test_persist_with_no_changes_is_safe() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "cfitsio:\n  version: 4.3.1\n").unwrap();

        let store = ReferenceStore::load(store_path(&dir)).unwrap();
        store.persist().unwrap();

        let reloaded = ReferenceStore::load(store_path(&dir)).unwrap();
        assert_eq!(reloaded.get("cfitsio").version(), Some("4.3.1"));
    }
}
