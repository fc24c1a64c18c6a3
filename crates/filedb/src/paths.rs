//! On-disk layout of a store.
//!
//! ```text
//! <root>/
//! └── store/
//!     ├── index.json            # { "<collection>": ["<id>", ...], ... }
//!     └── <collection>/
//!         └── <id>.json         # One serialized record
//! ```

use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = "store";
pub const INDEX_FILE: &str = "index.json";
pub const RECORD_EXT: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store_dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.store_dir().join(INDEX_FILE)
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.store_dir().join(collection)
    }

    pub fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.{}", id, RECORD_EXT))
    }

    /// Extract the record id from a path inside a collection directory.
    /// Returns None for anything that is not a `.json` file (temp files included).
    pub fn record_id_from_path(path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
            return None;
        }
        let stem = path.file_stem().and_then(|s| s.to_str())?;
        if stem.is_empty() || stem.starts_with('.') {
            return None;
        }
        Some(stem.to_string())
    }
}
