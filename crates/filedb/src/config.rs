//! # Configuration
//!
//! The store takes a single setting: the root directory under which the
//! `store/` tree lives. It is managed by [`confique`], which layers sources
//! in priority order:
//!
//! 1. **Environment variables**: `FILEDB_ROOT`.
//! 2. **Config file**: an optional TOML file passed to [`StoreConfig::load`].
//!
//! There is no compiled default. A store without a root is a configuration
//! error, reported as [`FileDbError::Config`].
//!
//! | Key    | Env var       | Description                             |
//! |--------|---------------|-----------------------------------------|
//! | `root` | `FILEDB_ROOT` | Directory holding `store/index.json` and the collection folders |

use crate::error::{FileDbError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a file store, optionally read from `filedb.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root directory of the store.
    #[config(env = "FILEDB_ROOT")]
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load configuration from the environment, falling back to `file` when given.
    ///
    /// A missing file is ignored; a missing `root` is not.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        let config = builder
            .load()
            .map_err(|e| FileDbError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject an empty root path.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(FileDbError::Config(
                "a root path is required to open a store".to_string(),
            ));
        }
        Ok(())
    }
}
