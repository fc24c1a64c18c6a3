//! # Records
//!
//! The store does not own the shape of the data it keeps. Anything that can
//! name its collection and its id, and round-trip through serde, can be
//! persisted: that is the [`Record`] trait.
//!
//! [`Document`] is the schemaless record shipped with the crate. It keeps the
//! two identifying keys under `_id` and `_collection` and flattens every other
//! field into the top level of the file:
//!
//! ```json
//! {
//!   "_id": "5f0c…",
//!   "_collection": "notes",
//!   "text": "Hello World"
//! }
//! ```
//!
//! The store never mutates a record. Ids are assigned by whoever builds the
//! record ([`Document::new`] uses a UUID v4).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A value the store can persist and index.
pub trait Record: Serialize + DeserializeOwned {
    /// Name of the collection the record belongs to.
    fn collection(&self) -> &str;

    /// Identifier, unique within the collection. Also the file stem on disk.
    fn id(&self) -> &str;
}

/// Key holding a document's id in its file.
pub const ID_KEY: &str = "_id";
/// Key holding a document's collection in its file.
pub const COLLECTION_KEY: &str = "_collection";

/// A schemaless record: identity plus arbitrary JSON fields.
///
/// `fields` never holds [`ID_KEY`] or [`COLLECTION_KEY`]; those live in `id`
/// and `collection` so each is written exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_collection")]
    pub collection: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document. A string `_id` in `fields` becomes the id,
    /// otherwise a fresh one is generated.
    pub fn new(collection: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        let id = match fields.remove(ID_KEY) {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Self::with_id(collection, id, fields)
    }

    /// Create a document with an explicit id. Identity keys in `fields` are dropped.
    pub fn with_id(
        collection: impl Into<String>,
        id: impl Into<String>,
        mut fields: Map<String, Value>,
    ) -> Self {
        fields.remove(ID_KEY);
        fields.remove(COLLECTION_KEY);
        Self {
            id: id.into(),
            collection: collection.into(),
            fields,
        }
    }

    /// Build a document from a JSON object literal. Non-object values yield no fields.
    pub fn from_value(collection: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(collection, fields)
    }

    /// Look up a field by dotted path (`"address.city"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.fields.get(segments.next()?)?;
        crate::query::value::descend(first, segments)
    }

    /// Set a field. A string `_id` replaces the id; `_collection` is ignored.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            ID_KEY => {
                if let Value::String(id) = value {
                    self.id = id;
                }
            }
            COLLECTION_KEY => {}
            _ => {
                self.fields.insert(key, value);
            }
        }
    }
}

impl Record for Document {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Which ids of a collection a remove call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    One(String),
    Many(Vec<String>),
    /// Every id currently indexed for the collection.
    All,
}

/// A remove request: a collection plus the ids to drop from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSpec {
    pub collection: String,
    pub target: RemoveTarget,
}

impl RemoveSpec {
    pub fn one(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            target: RemoveTarget::One(id.into()),
        }
    }

    pub fn many<I, S>(collection: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collection: collection.into(),
            target: RemoveTarget::Many(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn all(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            target: RemoveTarget::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_flat() {
        let doc = Document::from_value("test", json!({ "text": "Hello World" }));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["_id"], json!(doc.id));
        assert_eq!(value["_collection"], json!("test"));
        assert_eq!(value["text"], json!("Hello World"));
    }

    #[test]
    fn test_document_deserializes_extra_fields() {
        let raw = json!({ "_id": "a1", "_collection": "test", "n": 3, "tags": ["x"] });
        let doc: Document = serde_json::from_value(raw).unwrap();

        assert_eq!(doc.id, "a1");
        assert_eq!(doc.collection, "test");
        assert_eq!(doc.fields.get("n"), Some(&json!(3)));
        assert_eq!(doc.fields.len(), 2);
    }

    #[test]
    fn test_new_documents_get_distinct_ids() {
        let a = Document::new("test", Map::new());
        let b = Document::new("test", Map::new());
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_supplied_id_becomes_identity() {
        let doc = Document::from_value(
            "test",
            json!({ "_id": "mine", "_collection": "other", "text": "a" }),
        );
        assert_eq!(doc.id, "mine");
        assert_eq!(doc.collection, "test");
        assert_eq!(doc.fields.len(), 1);

        let raw = serde_json::to_string(&doc).unwrap();
        assert_eq!(raw.matches("\"_id\"").count(), 1);
        assert_eq!(raw.matches("\"_collection\"").count(), 1);
        let back: Document = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_identity_keys_stay_out_of_fields() {
        let mut fields = Map::new();
        fields.insert("_id".into(), json!("ignored"));
        let mut doc = Document::with_id("test", "a1", fields);
        assert_eq!(doc.id, "a1");
        assert!(doc.fields.is_empty());

        doc.set("_collection", json!("other"));
        doc.set("_id", json!("b2"));
        doc.set("text", json!("x"));
        assert_eq!(doc.id, "b2");
        assert_eq!(doc.collection, "test");
        assert_eq!(doc.fields.len(), 1);
    }

    #[test]
    fn test_get_dotted_path() {
        let doc = Document::from_value("people", json!({ "address": { "city": "Lisbon" } }));
        assert_eq!(doc.get("address.city"), Some(&json!("Lisbon")));
        assert_eq!(doc.get("address.zip"), None);
        assert_eq!(doc.get("missing.city"), None);
    }

    #[test]
    fn test_remove_spec_builders() {
        assert_eq!(
            RemoveSpec::one("t", "a").target,
            RemoveTarget::One("a".to_string())
        );
        assert_eq!(
            RemoveSpec::many("t", ["a", "b"]).target,
            RemoveTarget::Many(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(RemoveSpec::all("t").target, RemoveTarget::All);
    }
}
