//! # Collection API
//!
//! A [`Collection`] binds a collection name to a [`FileStore`] and is the
//! surface callers normally use:
//!
//! ```no_run
//! # async fn demo() -> filedb::Result<()> {
//! use filedb::{Document, FileStore, RemoveTarget, StoreConfig};
//! use serde_json::json;
//!
//! let store = FileStore::open(StoreConfig::new("/tmp/filedb")).await?;
//! let notes = store.collection::<Document>("notes");
//!
//! let note = notes
//!     .insert(Document::from_value("notes", json!({ "text": "Hello World" })))
//!     .await?;
//! let found = notes.find(&json!({ "text": { "$exists": true } })).await?;
//! assert!(found.records.iter().any(|d| d.id == note.id));
//!
//! notes.remove(RemoveTarget::All).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every method checks the shape of its input before touching the store.
//! Malformed input is logged and returned as [`FileDbError::Validation`].

use crate::error::{FileDbError, Result};
use crate::model::{Record, RemoveSpec, RemoveTarget};
use crate::query::{Query, Selector};
use crate::store::{FileStore, ReadOutcome};
use serde_json::Value;
use std::marker::PhantomData;

pub struct Collection<'s, T> {
    store: &'s FileStore,
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<'s, T: Record> Collection<'s, T> {
    pub(crate) fn new(store: &'s FileStore, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find every record matching a raw JSON selector.
    ///
    /// Per-record load failures are returned in the outcome next to the
    /// records that did load.
    pub async fn find(&self, selector: &Value) -> Result<ReadOutcome<T>> {
        self.check_name("find")?;
        let selector = Selector::parse(selector).inspect_err(|e| {
            tracing::warn!(collection = %self.name, error = %e, "invalid find operation");
        })?;
        Ok(self.find_where(selector).await)
    }

    /// Find with an already parsed selector.
    pub async fn find_where(&self, selector: Selector) -> ReadOutcome<T> {
        self.store
            .read(&self.name, &Query::Selector(selector))
            .await
    }

    /// Load one record by id. `records` holds at most one entry.
    pub async fn find_by_id(&self, id: &str) -> Result<ReadOutcome<T>> {
        self.check_name("find")?;
        Ok(self.store.read(&self.name, &Query::Id(id.to_string())).await)
    }

    /// Write a record, replacing any record with the same id.
    pub async fn insert(&self, record: T) -> Result<T> {
        self.check_name("insert")?;
        if record.collection() != self.name {
            let msg = format!(
                "record belongs to collection {:?}, not {:?}",
                record.collection(),
                self.name
            );
            tracing::warn!(collection = %self.name, "invalid insert operation: {}", msg);
            return Err(FileDbError::Validation(msg));
        }
        self.store.write(record).await
    }

    /// Remove one id, a list of ids, or every record in the collection.
    pub async fn remove(&self, target: RemoveTarget) -> Result<usize> {
        self.check_name("remove")?;
        let spec = RemoveSpec {
            collection: self.name.clone(),
            target,
        };
        self.store.remove(&spec).await
    }

    fn check_name(&self, operation: &str) -> Result<()> {
        if self.name.is_empty() {
            tracing::warn!(operation, "invalid operation: collection name is required");
            return Err(FileDbError::Validation(format!(
                "{} requires a collection name",
                operation
            )));
        }
        Ok(())
    }
}
