use super::index::{IndexEntries, IndexStore};
use super::{ensure_dir, write_atomic, DoctorReport, ReadOutcome};
use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::error::{FileDbError, Result};
use crate::model::{Record, RemoveSpec, RemoveTarget};
use crate::paths::StorePaths;
use crate::query::Query;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::ErrorKind;
use tokio::sync::Mutex;

/// A document store rooted at one directory.
pub struct FileStore {
    paths: StorePaths,
    index: Mutex<IndexStore>,
}

impl FileStore {
    /// Open (or create) the store described by `config` and load its index.
    ///
    /// An index that exists but cannot be read is rebuilt from the collection
    /// directories instead of failing the open.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let paths = StorePaths::new(config.root);
        ensure_dir(&paths.store_dir()).await?;

        let (index, rebuild) = match IndexStore::load(paths.index_path()).await {
            Ok(index) => (index, false),
            Err(e) => {
                tracing::error!(error = %e, "could not load index, rebuilding from disk");
                (IndexStore::empty(paths.index_path()), true)
            }
        };

        let store = Self {
            paths,
            index: Mutex::new(index),
        };

        if rebuild {
            match store.doctor().await {
                Ok(report) => tracing::warn!(
                    recovered = report.recovered_records,
                    "index rebuilt from collection directories"
                ),
                Err(e) => tracing::error!(error = %e, "index rebuild failed, starting empty"),
            }
            // Replace the unreadable file even when the rebuild found nothing.
            if let Err(e) = store.index.lock().await.flush().await {
                tracing::error!(error = %e, "could not replace unreadable index");
            }
        }

        Ok(store)
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Bind a collection name for typed find/insert/remove.
    pub fn collection<T: Record>(&self, name: impl Into<String>) -> Collection<'_, T> {
        Collection::new(self, name)
    }

    /// A copy of the current index.
    pub async fn index_snapshot(&self) -> IndexEntries {
        self.index.lock().await.snapshot()
    }

    /// Persist a record, overwriting any record with the same id, then index it.
    ///
    /// If the index flush fails the record file is already on disk and the
    /// in-memory index already lists it; the error is still returned.
    pub async fn write<R: Record>(&self, record: R) -> Result<R> {
        let collection = record.collection();
        let id = record.id();
        validate_segment("collection name", collection)?;
        validate_segment("record id", id)?;

        let json = serde_json::to_string_pretty(&record)?;
        ensure_dir(&self.paths.collection_dir(collection)).await?;
        write_atomic(&self.paths.record_path(collection, id), json).await?;

        self.index.lock().await.add(collection, id).await?;
        tracing::debug!(collection, id, "record written");
        Ok(record)
    }

    /// Load records from a collection.
    ///
    /// `Query::Id` loads that single file whether or not it is indexed.
    /// `Query::Selector` loads every indexed id and keeps the matches, in
    /// index order. Per-file failures are collected, never short-circuited.
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> ReadOutcome<T> {
        let mut outcome = ReadOutcome::default();
        if let Err(e) = validate_segment("collection name", collection) {
            outcome.errors.push(e);
            return outcome;
        }

        let ids = match query {
            Query::Id(id) => vec![id.clone()],
            Query::Selector(_) => self.index.lock().await.ids(collection).to_vec(),
        };

        let loads = ids.iter().map(|id| self.load_raw(collection, id));
        let loaded = join_all(loads).await;

        for (id, result) in ids.iter().zip(loaded) {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(collection, id = id.as_str(), error = %e, "could not load record");
                    outcome.errors.push(e);
                    continue;
                }
            };

            if let Query::Selector(selector) = query {
                if !selector.matches(&raw) {
                    continue;
                }
            }

            match serde_json::from_value(raw) {
                Ok(record) => outcome.records.push(record),
                Err(e) => outcome
                    .errors
                    .push(FileDbError::parse(self.paths.record_path(collection, id), e)),
            }
        }

        outcome
    }

    /// Delete the targeted records of a collection.
    ///
    /// All deletions run concurrently and each one runs to completion. The
    /// index entry is dropped once the file is gone (including when it was
    /// already missing); any other unlink failure keeps the entry. Returns the
    /// number of records removed, or the first failure.
    pub async fn remove(&self, spec: &RemoveSpec) -> Result<usize> {
        let collection = spec.collection.as_str();
        validate_segment("collection name", collection)?;

        let ids = match &spec.target {
            RemoveTarget::One(id) => vec![id.clone()],
            RemoveTarget::Many(ids) => ids.clone(),
            RemoveTarget::All => self.index.lock().await.ids(collection).to_vec(),
        };

        let deletions = ids.iter().map(|id| self.remove_one(collection, id));
        let results = join_all(deletions).await;

        let mut removed = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(collection, error = %e, "remove failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Reconcile the index with the files on disk.
    pub async fn doctor(&self) -> Result<DoctorReport> {
        let on_disk = self.scan_collections().await?;
        let mut index = self.index.lock().await;
        let mut report = DoctorReport::default();

        // 1. Orphans: files nobody indexed
        for (collection, ids) in &on_disk {
            for id in ids {
                if index.adopt(collection, id) {
                    report.recovered_records += 1;
                }
            }
        }

        // 2. Zombies: indexed ids without a file
        for (collection, ids) in index.snapshot() {
            for id in ids {
                let present = on_disk
                    .get(&collection)
                    .is_some_and(|found| found.contains(&id));
                if !present && index.forget(&collection, &id) {
                    report.dropped_missing += 1;
                }
            }
        }

        if report.changed() {
            index.flush().await?;
        }
        Ok(report)
    }

    async fn load_raw(&self, collection: &str, id: &str) -> Result<Value> {
        validate_segment("record id", id)?;
        let path = self.paths.record_path(collection, id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FileDbError::io(&path, e))?;
        serde_json::from_str(&content).map_err(|e| FileDbError::parse(&path, e))
    }

    /// Returns whether anything (file or index entry) was removed.
    async fn remove_one(&self, collection: &str, id: &str) -> Result<bool> {
        validate_segment("record id", id)?;
        let path = self.paths.record_path(collection, id);

        let unlinked = match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(collection, id, "record file already absent");
                false
            }
            Err(e) => return Err(FileDbError::io(&path, e)),
        };

        let mut index = self.index.lock().await;
        let forgotten = index.forget(collection, id);
        if forgotten {
            index.flush().await?;
        }
        Ok(unlinked || forgotten)
    }

    /// Every `<collection>/<id>.json` currently on disk, ids sorted.
    async fn scan_collections(&self) -> Result<IndexEntries> {
        let store_dir = self.paths.store_dir();
        let mut found = IndexEntries::new();

        let mut dirs = match tokio::fs::read_dir(&store_dir).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(FileDbError::io(&store_dir, e)),
        };

        while let Some(entry) = dirs
            .next_entry()
            .await
            .map_err(|e| FileDbError::io(&store_dir, e))?
        {
            let dir = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| FileDbError::io(&dir, e))?;
            if !file_type.is_dir() {
                continue;
            }
            let Some(collection) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            let mut ids = Vec::new();
            let mut files = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| FileDbError::io(&dir, e))?;
            while let Some(file) = files
                .next_entry()
                .await
                .map_err(|e| FileDbError::io(&dir, e))?
            {
                if let Some(id) = StorePaths::record_id_from_path(&file.path()) {
                    ids.push(id);
                }
            }

            if !ids.is_empty() {
                ids.sort();
                found.insert(collection, ids);
            }
        }

        Ok(found)
    }
}

/// Collection names and ids become path segments; keep them to one segment.
fn validate_segment(kind: &str, value: &str) -> Result<()> {
    let problem = if value.is_empty() {
        Some("must not be empty")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value.starts_with('.') {
        Some("must not start with '.'")
    } else {
        None
    };

    match problem {
        Some(problem) => {
            tracing::warn!(kind, value, "rejected: {}", problem);
            Err(FileDbError::Validation(format!("{} {:?} {}", kind, value, problem)))
        }
        None => Ok(()),
    }
}
