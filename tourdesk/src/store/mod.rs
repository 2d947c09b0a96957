//! Embedded document store
//!
//! An in-process stand-in for an external document database: named
//! collections of JSON documents behind an async read-write lock. The store
//! owns document identity (`_id`), the schema version marker (`__v`) and the
//! creation timestamp (`createdAt`), stamping each on insert when absent.
//!
//! The store is the only shared resource between concurrent requests; its
//! lock is held for the duration of a single operation, never across awaits
//! visible to callers.

pub mod error;
mod filter;
pub mod query;

pub use error::{StoreError, StoreResult};
pub use query::{FindQuery, Projection, SortOrder, SortSpec};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A JSON document as stored in a collection
pub type JsonMap = serde_json::Map<String, Value>;

/// Document identifier field, set on insert and immutable thereafter
pub const ID_FIELD: &str = "_id";

/// Schema version marker stamped on every document
pub const VERSION_FIELD: &str = "__v";

/// Creation timestamp field (RFC 3339 UTC), stamped on insert when absent
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Instruction for attaching related documents on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateSpec {
    /// Replace an id (or array of ids) held in `field` with the referenced
    /// document(s) from `collection`. Ids that resolve to nothing are
    /// dropped from arrays and left as-is for single references.
    Reference {
        field: &'static str,
        collection: &'static str,
    },
    /// Attach every document of `collection` whose `foreign_field` equals
    /// this document's id, under a new `attach_as` field.
    Virtual {
        attach_as: &'static str,
        collection: &'static str,
        foreign_field: &'static str,
    },
}

/// Handle to the shared document store; cheap to clone
#[derive(Debug, Clone, Default)]
pub struct Store {
    collections: Arc<RwLock<HashMap<String, Vec<JsonMap>>>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle to a named collection, creating it lazily on first write
    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            store: self.clone(),
            name: name.to_string(),
        }
    }

    /// Attach related documents to `doc` according to the given specs
    pub async fn populate(&self, doc: &mut Value, specs: &[PopulateSpec]) -> StoreResult<()> {
        let Some(map) = doc.as_object_mut() else {
            return Ok(());
        };

        for spec in specs {
            match spec {
                PopulateSpec::Reference { field, collection } => {
                    match map.get(*field).cloned() {
                        Some(Value::String(id)) => {
                            if let Some(related) =
                                self.collection(collection).find_by_id(&id).await?
                            {
                                map.insert((*field).to_string(), related);
                            }
                        }
                        Some(Value::Array(ids)) => {
                            let mut resolved = Vec::with_capacity(ids.len());
                            for id in ids {
                                let Value::String(id) = id else { continue };
                                if let Some(related) =
                                    self.collection(collection).find_by_id(&id).await?
                                {
                                    resolved.push(related);
                                }
                            }
                            map.insert((*field).to_string(), Value::Array(resolved));
                        }
                        _ => {}
                    }
                }
                PopulateSpec::Virtual {
                    attach_as,
                    collection,
                    foreign_field,
                } => {
                    let Some(id) = map.get(ID_FIELD).and_then(Value::as_str) else {
                        continue;
                    };
                    let mut predicate = JsonMap::new();
                    predicate.insert(
                        (*foreign_field).to_string(),
                        Value::String(id.to_string()),
                    );
                    let related = self
                        .collection(collection)
                        .find()
                        .filter(predicate)
                        .run()
                        .await?;
                    map.insert((*attach_as).to_string(), Value::Array(related));
                }
            }
        }

        Ok(())
    }
}

/// Handle to one named collection
#[derive(Debug, Clone)]
pub struct Collection {
    store: Store,
    name: String,
}

impl Collection {
    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a chainable read query against this collection
    pub fn find(&self) -> FindQuery {
        FindQuery::new(self.clone())
    }

    /// Fetch a single document by id
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        let guard = self.store.collections.read().await;
        Ok(guard.get(&self.name).and_then(|docs| {
            docs.iter()
                .find(|doc| doc_id(doc) == Some(id))
                .cloned()
                .map(Value::Object)
        }))
    }

    /// Insert a document, stamping `_id`, `__v` and `createdAt` when absent.
    ///
    /// Fails with [`StoreError::Duplicate`] if any of the `unique` fields
    /// already holds the same value elsewhere in the collection. Returns the
    /// stored document.
    pub async fn insert(&self, doc: Value, unique: &[&str]) -> StoreResult<Value> {
        let mut map = into_object(doc)?;
        stamp(&mut map);

        let mut guard = self.store.collections.write().await;
        let docs = guard.entry(self.name.clone()).or_default();

        for field in unique {
            if let Some(value) = map.get(*field) {
                if docs.iter().any(|existing| existing.get(*field) == Some(value)) {
                    return Err(StoreError::duplicate(*field, value.to_string()));
                }
            }
        }

        docs.push(map.clone());
        Ok(Value::Object(map))
    }

    /// Merge a partial payload into the document with the given id.
    ///
    /// Returns `Ok(None)` when no such document exists. The identifier field
    /// is never overwritten. Unique fields are re-checked against the rest
    /// of the collection.
    pub async fn update_by_id(
        &self,
        id: &str,
        patch: Value,
        unique: &[&str],
    ) -> StoreResult<Option<Value>> {
        let patch = into_object(patch)?;

        let mut guard = self.store.collections.write().await;
        let Some(docs) = guard.get_mut(&self.name) else {
            return Ok(None);
        };

        for field in unique {
            if let Some(value) = patch.get(*field) {
                let taken = docs
                    .iter()
                    .any(|other| doc_id(other) != Some(id) && other.get(*field) == Some(value));
                if taken {
                    return Err(StoreError::duplicate(*field, value.to_string()));
                }
            }
        }

        let Some(doc) = docs.iter_mut().find(|doc| doc_id(doc) == Some(id)) else {
            return Ok(None);
        };
        for (key, value) in patch {
            if key != ID_FIELD {
                doc.insert(key, value);
            }
        }
        Ok(Some(Value::Object(doc.clone())))
    }

    /// Delete the document with the given id; reports whether one existed
    pub async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut guard = self.store.collections.write().await;
        let Some(docs) = guard.get_mut(&self.name) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc_id(doc) != Some(id));
        Ok(docs.len() < before)
    }

    /// Number of documents currently in the collection
    pub async fn count(&self) -> usize {
        let guard = self.store.collections.read().await;
        guard.get(&self.name).map_or(0, Vec::len)
    }

    pub(crate) async fn snapshot(&self) -> Vec<JsonMap> {
        let guard = self.store.collections.read().await;
        guard.get(&self.name).cloned().unwrap_or_default()
    }
}

fn doc_id(doc: &JsonMap) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn into_object(doc: Value) -> StoreResult<JsonMap> {
    match doc {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Validation(
            "Payload must be a JSON object".to_string(),
        )),
    }
}

fn stamp(map: &mut JsonMap) {
    map.entry(ID_FIELD)
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    map.entry(VERSION_FIELD).or_insert(Value::from(0));
    map.entry(CREATED_AT_FIELD).or_insert_with(|| {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_stamps_bookkeeping_fields() {
        let store = Store::new();
        let doc = store
            .collection("tours")
            .insert(json!({"name": "Sea Explorer"}), &[])
            .await
            .expect("insert");

        let map = doc.as_object().expect("object");
        assert!(map.get(ID_FIELD).and_then(Value::as_str).is_some());
        assert_eq!(map.get(VERSION_FIELD), Some(&json!(0)));
        assert!(map.get(CREATED_AT_FIELD).and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn test_insert_keeps_provided_id() {
        let store = Store::new();
        let doc = store
            .collection("tours")
            .insert(json!({"_id": "tour-1", "name": "Sea Explorer"}), &[])
            .await
            .expect("insert");
        assert_eq!(doc["_id"], json!("tour-1"));
    }

    #[tokio::test]
    async fn test_insert_rejects_non_object_payload() {
        let store = Store::new();
        let err = store
            .collection("tours")
            .insert(json!([1, 2, 3]), &[])
            .await
            .expect_err("must fail");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unique_field_rejects_duplicate() {
        let store = Store::new();
        let tours = store.collection("tours");
        tours
            .insert(json!({"name": "Sea Explorer"}), &["name"])
            .await
            .expect("first insert");
        let err = tours
            .insert(json!({"name": "Sea Explorer"}), &["name"])
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_find_by_id_roundtrip() {
        let store = Store::new();
        let doc = store
            .collection("tours")
            .insert(json!({"name": "Sea Explorer"}), &[])
            .await
            .expect("insert");
        let id = doc["_id"].as_str().expect("id").to_string();

        let found = store
            .collection("tours")
            .find_by_id(&id)
            .await
            .expect("lookup");
        assert_eq!(found.expect("present")["name"], json!("Sea Explorer"));

        let missing = store
            .collection("tours")
            .find_by_id("nope")
            .await
            .expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_id() {
        let store = Store::new();
        let tours = store.collection("tours");
        let doc = tours
            .insert(json!({"name": "Sea Explorer", "price": 497}), &[])
            .await
            .expect("insert");
        let id = doc["_id"].as_str().expect("id").to_string();

        let updated = tours
            .update_by_id(&id, json!({"price": 550, "_id": "hijack"}), &[])
            .await
            .expect("update")
            .expect("present");

        assert_eq!(updated["price"], json!(550));
        assert_eq!(updated["name"], json!("Sea Explorer"));
        assert_eq!(updated["_id"], json!(id));
    }

    #[tokio::test]
    async fn test_update_missing_id_returns_none() {
        let store = Store::new();
        let result = store
            .collection("tours")
            .update_by_id("nope", json!({"price": 1}), &[])
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_unique_check_ignores_self() {
        let store = Store::new();
        let tours = store.collection("tours");
        let doc = tours
            .insert(json!({"name": "Sea Explorer"}), &["name"])
            .await
            .expect("insert");
        let id = doc["_id"].as_str().expect("id").to_string();

        // Re-asserting the same name on the same document is fine
        tours
            .update_by_id(&id, json!({"name": "Sea Explorer"}), &["name"])
            .await
            .expect("update")
            .expect("present");

        tours
            .insert(json!({"name": "Forest Hiker"}), &["name"])
            .await
            .expect("insert");
        let err = tours
            .update_by_id(&id, json!({"name": "Forest Hiker"}), &["name"])
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = Store::new();
        let tours = store.collection("tours");
        let doc = tours
            .insert(json!({"name": "Sea Explorer"}), &[])
            .await
            .expect("insert");
        let id = doc["_id"].as_str().expect("id").to_string();

        assert!(tours.delete_by_id(&id).await.expect("delete"));
        assert!(!tours.delete_by_id(&id).await.expect("delete again"));
        assert_eq!(tours.count().await, 0);
    }

    #[tokio::test]
    async fn test_populate_reference_single_and_array() {
        let store = Store::new();
        let users = store.collection("users");
        let guide = users
            .insert(json!({"_id": "user-1", "name": "Aarav"}), &[])
            .await
            .expect("insert");

        let mut doc = json!({
            "_id": "tour-1",
            "user": "user-1",
            "guides": ["user-1", "missing"],
        });
        store
            .populate(
                &mut doc,
                &[
                    PopulateSpec::Reference {
                        field: "user",
                        collection: "users",
                    },
                    PopulateSpec::Reference {
                        field: "guides",
                        collection: "users",
                    },
                ],
            )
            .await
            .expect("populate");

        assert_eq!(doc["user"], guide);
        let guides = doc["guides"].as_array().expect("array");
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0]["name"], json!("Aarav"));
    }

    #[tokio::test]
    async fn test_populate_virtual_attaches_children() {
        let store = Store::new();
        store
            .collection("reviews")
            .insert(json!({"tour": "tour-1", "rating": 5}), &[])
            .await
            .expect("insert");
        store
            .collection("reviews")
            .insert(json!({"tour": "tour-2", "rating": 3}), &[])
            .await
            .expect("insert");

        let mut doc = json!({"_id": "tour-1", "name": "Sea Explorer"});
        store
            .populate(
                &mut doc,
                &[PopulateSpec::Virtual {
                    attach_as: "reviews",
                    collection: "reviews",
                    foreign_field: "tour",
                }],
            )
            .await
            .expect("populate");

        let reviews = doc["reviews"].as_array().expect("array");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["rating"], json!(5));
    }
}
