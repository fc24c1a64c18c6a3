//! # Storage Layer
//!
//! Records are plain JSON files, one per record, grouped in a directory per
//! collection. A single index file lists which ids exist in each collection.
//!
//! ## Files and Index
//!
//! 1. **Records**: `store/<collection>/<id>.json`, written atomically
//!    (temp file, then rename) with pretty-printed JSON.
//! 2. **Index**: `store/index.json`, rewritten in full after every mutation.
//!
//! Writes put the file on disk first and update the index second, so a crash
//! in between leaves an orphan file rather than an index entry pointing at
//! nothing. Removes delete the file first and only drop the index entry once
//! the file is confirmed gone.
//!
//! ## Reads
//!
//! A selector read never consults the filesystem for discovery: it loads
//! exactly the ids the index lists. Files that fail to load or parse are
//! reported in [`ReadOutcome::errors`] while the remaining records are still
//! matched and returned.
//!
//! ## Reconciliation
//!
//! [`FileStore::doctor`] brings the index back in line with the disk:
//!
//! - **Orphan Adoption**: `<collection>/<id>.json` exists but `id` is not indexed → add it.
//! - **Zombie Cleanup**: `id` is indexed but its file is missing → drop it.
//!
//! The same pass rebuilds the index at startup when `index.json` cannot be read.
//!
//! ## Concurrency
//!
//! The index is shared by every operation of a store and sits behind an async
//! mutex. That keeps concurrent futures from the same store memory-safe; it is
//! not a transaction. Multiple processes writing one root are unsupported.

use crate::error::{FileDbError, Result};
use std::path::Path;
use uuid::Uuid;

pub mod fs;
pub mod index;

pub use fs::FileStore;
pub use index::{IndexEntries, IndexStore};

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub recovered_records: usize,
    pub dropped_missing: usize,
}

impl DoctorReport {
    pub fn changed(&self) -> bool {
        self.recovered_records > 0 || self.dropped_missing > 0
    }
}

/// Records found by a read, plus every per-file failure met along the way.
#[derive(Debug)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub errors: Vec<FileDbError>,
}

impl<T> Default for ReadOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ReadOutcome<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first record, for single-id lookups.
    pub fn into_first(self) -> Option<T> {
        self.records.into_iter().next()
    }

    /// Fail with the first error if any occurred, dropping partial results.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}

/// Write `content` to `target` through a temp file in the same directory.
pub(crate) async fn write_atomic(target: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));

    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| FileDbError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, target).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(FileDbError::io(target, e));
    }
    Ok(())
}

/// Create a directory (and parents). An existing directory is fine.
pub(crate) async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| FileDbError::io(path, e))
}
