mod common;

use common::{hello_world, TestEnv};
use filedb::{Document, Record, RemoveTarget};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[tokio::test]
async fn test_insert_then_find_by_id_round_trips() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");

    let inserted = test.insert(hello_world("test")).await.unwrap();
    let found = test.find_by_id(&inserted.id).await.unwrap();

    assert!(!found.has_errors());
    assert_eq!(found.into_first(), Some(inserted));
}

#[tokio::test]
async fn test_caller_supplied_id_round_trips() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");

    let inserted = test
        .insert(Document::from_value("test", json!({ "_id": "mine", "text": "a" })))
        .await
        .unwrap();
    assert_eq!(inserted.id, "mine");

    let found = test.find_by_id("mine").await.unwrap();
    assert!(!found.has_errors());
    assert_eq!(found.into_first(), Some(inserted.clone()));

    let by_selector = test.find(&json!({ "_id": "mine" })).await.unwrap();
    assert_eq!(by_selector.records, vec![inserted]);

    let raw = std::fs::read_to_string(env.store.paths().record_path("test", "mine")).unwrap();
    assert_eq!(raw.matches("\"_id\"").count(), 1);
}

#[tokio::test]
async fn test_index_tracks_single_collection() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");

    let doc = test.insert(hello_world("test")).await.unwrap();
    assert_eq!(env.index_on_disk(), json!({ "test": [doc.id] }));

    test.remove(RemoveTarget::One(doc.id.clone())).await.unwrap();
    assert_eq!(env.index_on_disk(), json!({}));
    assert!(env.store.index_snapshot().await.is_empty());
}

#[tokio::test]
async fn test_reinsert_overwrites_without_duplicating() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");

    let mut doc = test.insert(hello_world("test")).await.unwrap();
    doc.set("text", json!("Goodbye"));
    test.insert(doc.clone()).await.unwrap();

    let index = env.store.index_snapshot().await;
    assert_eq!(index.get("test"), Some(&vec![doc.id.clone()]));

    let found = test.find_by_id(&doc.id).await.unwrap().into_first().unwrap();
    assert_eq!(found.get("text"), Some(&json!("Goodbye")));
}

#[tokio::test]
async fn test_find_by_equality() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");
    let doc = test.insert(hello_world("test")).await.unwrap();

    let hit = test.find(&json!({ "text": "Hello World" })).await.unwrap();
    assert_eq!(hit.records.len(), 1);
    assert_eq!(hit.records[0].id, doc.id);

    let miss = test.find(&json!({ "text": "Nope" })).await.unwrap();
    assert!(miss.records.is_empty());
}

#[tokio::test]
async fn test_find_with_exists() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");
    let with_text = test.insert(hello_world("test")).await.unwrap();
    let without_text = test
        .insert(Document::from_value("test", json!({ "other": 1 })))
        .await
        .unwrap();

    let present = test
        .find(&json!({ "text": { "$exists": true } }))
        .await
        .unwrap();
    assert_eq!(present.records, vec![with_text]);

    let absent = test
        .find(&json!({ "text": { "$exists": false } }))
        .await
        .unwrap();
    assert_eq!(absent.records, vec![without_text]);
}

#[tokio::test]
async fn test_find_with_in() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");
    let doc = test.insert(hello_world("test")).await.unwrap();

    let found = test
        .find(&json!({ "text": { "$in": ["Hello World", "Other"] } }))
        .await
        .unwrap();
    assert_eq!(found.records, vec![doc]);
}

#[tokio::test]
async fn test_find_with_or() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");
    let doc = test.insert(hello_world("test")).await.unwrap();

    let found = test
        .find(&json!({ "$or": [{ "text": "nope" }, { "text": "Hello World" }] }))
        .await
        .unwrap();
    assert_eq!(found.records, vec![doc]);
}

#[tokio::test]
async fn test_find_with_dotted_path() {
    let env = TestEnv::new().await;
    let people = env.store.collection::<Document>("people");
    let ana = people
        .insert(Document::from_value(
            "people",
            json!({ "name": "Ana", "address": { "city": "Lisbon" } }),
        ))
        .await
        .unwrap();
    people
        .insert(Document::from_value(
            "people",
            json!({ "name": "Bo", "address": { "city": "Oslo" } }),
        ))
        .await
        .unwrap();

    let found = people
        .find(&json!({ "address.city": "Lisbon" }))
        .await
        .unwrap();
    assert_eq!(found.records, vec![ana]);
}

#[tokio::test]
async fn test_remove_all_clears_collection() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");
    let other = env.store.collection::<Document>("other");

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(test.insert(hello_world("test")).await.unwrap().id);
    }
    let kept = other.insert(hello_world("other")).await.unwrap();

    let removed = test.remove(RemoveTarget::All).await.unwrap();
    assert_eq!(removed, 3);

    for id in &ids {
        assert!(!env.store.paths().record_path("test", id).exists());
    }
    assert_eq!(env.index_on_disk(), json!({ "other": [kept.id] }));
    assert!(test.find(&json!({})).await.unwrap().records.is_empty());
}

#[tokio::test]
async fn test_find_tolerates_missing_files() {
    let env = TestEnv::new().await;
    let test = env.store.collection::<Document>("test");

    let gone = test.insert(hello_world("test")).await.unwrap();
    let kept = test.insert(hello_world("test")).await.unwrap();
    std::fs::remove_file(env.store.paths().record_path("test", &gone.id)).unwrap();

    let found = test.find(&json!({ "text": "Hello World" })).await.unwrap();
    assert_eq!(found.records, vec![kept]);
    assert_eq!(found.errors.len(), 1);
    assert!(found.errors[0].is_not_found());
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let env = TestEnv::new().await;
    let doc = env
        .store
        .collection::<Document>("test")
        .insert(hello_world("test"))
        .await
        .unwrap();

    let reopened = env.reopen().await;
    let found = reopened
        .collection::<Document>("test")
        .find(&json!({ "text": "Hello World" }))
        .await
        .unwrap();
    assert_eq!(found.records, vec![doc]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    id: String,
    #[serde(skip, default = "tasks_collection")]
    collection: String,
    title: String,
    done: bool,
}

fn tasks_collection() -> String {
    "tasks".to_string()
}

impl Record for Task {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[tokio::test]
async fn test_typed_records() {
    let env = TestEnv::new().await;
    let tasks = env.store.collection::<Task>("tasks");
    let task = Task {
        id: "t1".into(),
        collection: tasks_collection(),
        title: "write docs".into(),
        done: false,
    };
    tasks.insert(task.clone()).await.unwrap();

    let open = tasks.find(&json!({ "done": false })).await.unwrap();
    assert_eq!(open.records, vec![task]);
    let done = tasks.find(&json!({ "done": true })).await.unwrap();
    assert!(done.records.is_empty());
}
