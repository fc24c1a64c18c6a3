//! # filedb Architecture
//!
//! filedb is a **minimal local document store**. Every record is a JSON file
//! on disk, grouped by collection, and one shared index file tracks which ids
//! exist in each collection. It is meant for a single process with a single
//! logical writer: there are no transactions and no cross-process locking.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collection API (collection.rs)                             │
//! │  - Binds a collection name: find / find_by_id / insert /    │
//! │    remove                                                   │
//! │  - Validates input shape, logs and rejects malformed calls  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Store (store/fs.rs)                                 │
//! │  - Writes, reads and deletes record files                   │
//! │  - Keeps the index in step with the disk, runs doctor       │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                │
//!              ▼                                ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │  Index Store              │   │  Selector Matcher (query/)  │
//! │  (store/index.rs)         │   │  - Parses JSON selectors    │
//! │  - collection → ids       │   │  - Loose equality, dotted   │
//! │  - full flush per change  │   │    paths, $exists/$in/$or   │
//! └───────────────────────────┘   └─────────────────────────────┘
//!              │
//!              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Path Resolver (paths.rs)                                   │
//! │  <root>/store/index.json, <root>/store/<name>/<id>.json     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Async
//!
//! Every operation is an `async fn` running on tokio. Batch reads and batch
//! removes fan out concurrently and are joined before the call completes.
//! Nothing is cancelled or timed out: an operation runs to completion or
//! failure.
//!
//! ## Errors
//!
//! All failures are [`FileDbError`] values. Reads that touch many files do not
//! stop at the first bad file: see [`ReadOutcome`]. The library logs through
//! `tracing` and never installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`collection`]: The per-collection facade
//! - [`store`]: Record files, the index, and reconciliation
//! - [`query`]: Selector parsing and matching
//! - [`model`]: The [`Record`] trait, [`Document`], remove targets
//! - [`paths`]: On-disk layout
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod query;
pub mod store;

pub use collection::Collection;
pub use config::StoreConfig;
pub use error::{FileDbError, Result};
pub use model::{Document, Record, RemoveSpec, RemoveTarget};
pub use query::{Query, Selector};
pub use store::{DoctorReport, FileStore, ReadOutcome};
