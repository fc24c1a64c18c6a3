//! The id index: collection name to the ordered list of ids stored in it.
//!
//! The index lives in memory for the lifetime of a [`super::FileStore`] and is
//! mirrored to `store/index.json` after every mutation. A flush always
//! rewrites the whole file.
//!
//! Collections are kept sorted so the file is stable across runs; ids keep
//! insertion order and never repeat. A collection whose last id is removed
//! disappears from the index.

use super::write_atomic;
use crate::error::{FileDbError, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub type IndexEntries = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
    entries: IndexEntries,
}

impl IndexStore {
    /// An empty index that will flush to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: IndexEntries::new(),
        }
    }

    /// Read the persisted index. A missing file is an empty index, not an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::empty(path)),
            Err(e) => return Err(FileDbError::io(path, e)),
        };
        let entries: IndexEntries =
            serde_json::from_str(&content).map_err(|e| FileDbError::parse(&path, e))?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids indexed for a collection, in insertion order.
    pub fn ids(&self, collection: &str) -> &[String] {
        self.entries
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.ids(collection).iter().any(|existing| existing == id)
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> IndexEntries {
        self.entries.clone()
    }

    /// Append `id` to the collection if absent, in memory only.
    /// Returns whether the index changed.
    pub fn adopt(&mut self, collection: &str, id: &str) -> bool {
        let ids = self.entries.entry(collection.to_string()).or_default();
        if ids.iter().any(|existing| existing == id) {
            return false;
        }
        ids.push(id.to_string());
        true
    }

    /// Drop `id` from the collection, in memory only. An emptied collection is removed.
    /// Returns whether the index changed.
    pub fn forget(&mut self, collection: &str, id: &str) -> bool {
        let Some(ids) = self.entries.get_mut(collection) else {
            return false;
        };
        let before = ids.len();
        ids.retain(|existing| existing != id);
        let changed = ids.len() != before;
        if ids.is_empty() {
            self.entries.remove(collection);
        }
        changed
    }

    /// Record `id` in the collection and flush.
    ///
    /// When the flush fails the in-memory index keeps the new id.
    pub async fn add(&mut self, collection: &str, id: &str) -> Result<()> {
        self.adopt(collection, id);
        self.flush().await
    }

    /// Remove `id` from the collection and flush.
    pub async fn remove(&mut self, collection: &str, id: &str) -> Result<()> {
        self.forget(collection, id);
        self.flush().await
    }

    /// Rewrite the index file with the full in-memory index.
    pub async fn flush(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        if let Err(e) = write_atomic(&self.path, content).await {
            tracing::error!(path = %self.path.display(), error = %e, "could not write index");
            return Err(e);
        }
        Ok(())
    }
}
