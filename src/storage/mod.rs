//! Storage clients
//!
//! A key-value store and a file store rooted in the configured data
//! directory. Both are explicitly constructed and injected into the
//! components that need them; nothing reaches for ambient global state.

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// File storage scoped to a root directory.
///
/// Paths are storage-relative (e.g. `example.com/docs/page#content.txt`);
/// hostname-scoped subtrees can be removed wholesale when a site is deleted.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a storage-relative path to an absolute one.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }

    /// Read the content stored at `rel`.
    pub fn read(&self, rel: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.resolve(rel))?)
    }

    /// Write `content` at `rel`, creating missing parent directories.
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.resolve(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }

    /// Remove the file or subtree at `prefix`. Removing a missing prefix is
    /// not an error.
    pub fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let path = self.resolve(prefix);
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!("Deleted {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

}

/// Key-value store persisted as a single JSON object file.
///
/// Every `set` rewrites the whole file; values are overwritten wholesale,
/// matching the registry's whole-list persistence semantics.
#[derive(Debug, Clone)]
pub struct KvStore {
    file: PathBuf,
}

impl KvStore {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    fn load_map(&self) -> Result<BTreeMap<String, Value>> {
        match std::fs::read_to_string(&self.file) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load_map()?.remove(key))
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(key.to_string(), value);
        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.file, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}

/// Build the storage clients for a config's paths.
pub fn open_stores(paths: &crate::config::PathsConfig) -> (FileStore, KvStore) {
    (
        FileStore::new(paths.data_dir.clone()),
        KvStore::new(paths.kv_file.clone()),
    )
}
