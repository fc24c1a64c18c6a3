use filedb::{Document, FileStore, StoreConfig};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the directory alive until the test is done
    pub _temp_dir: TempDir,
    pub store: FileStore,
    pub root: PathBuf,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store = FileStore::open(StoreConfig::new(&root))
            .await
            .expect("failed to open store");
        Self {
            _temp_dir: temp_dir,
            store,
            root,
        }
    }

    /// Open a second store on the same root, as a restarted process would.
    pub async fn reopen(&self) -> FileStore {
        FileStore::open(StoreConfig::new(&self.root))
            .await
            .expect("failed to reopen store")
    }

    pub fn index_on_disk(&self) -> Value {
        let raw = std::fs::read_to_string(self.root.join("store").join("index.json"))
            .expect("index file missing");
        serde_json::from_str(&raw).expect("index file is not json")
    }
}

pub fn hello_world(collection: &str) -> Document {
    Document::from_value(collection, json!({ "text": "Hello World" }))
}
