//! In-memory store for tests and dry runs.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{ContentStore, Query, StoreError, doc_id};

/// A [`ContentStore`] backed by a map, keyed by document id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.docs.get(id)
    }
}

impl ContentStore for MemoryStore {
    fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .docs
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect())
    }

    fn create(&mut self, doc: Value) -> Result<String, StoreError> {
        let id = doc_id(&doc)?;
        if self.docs.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.docs.insert(id.clone(), doc);
        Ok(id)
    }

    fn create_or_replace(&mut self, doc: Value) -> Result<String, StoreError> {
        let id = doc_id(&doc)?;
        self.docs.insert(id.clone(), doc);
        Ok(id)
    }

    fn patch_set(&mut self, id: &str, fields: Map<String, Value>) -> Result<String, StoreError> {
        let doc = self
            .docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Value::Object(map) = doc {
            for (field, value) in fields {
                map.insert(field, value);
            }
        }
        Ok(id.to_string())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.docs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Patch;
    use serde_json::json;

    fn post(id: &str, slug: &str) -> Value {
        json!({ "_id": id, "_type": "post", "slug": slug, "title": slug })
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let mut store = MemoryStore::new();
        store.create(post("post-a", "a")).unwrap();
        let err = store.create(post("post-a", "a")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn create_or_replace_upserts() {
        let mut store = MemoryStore::new();
        store.create_or_replace(post("post-a", "a")).unwrap();
        let mut updated = post("post-a", "a");
        updated["title"] = json!("updated");
        store.create_or_replace(updated).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("post-a").unwrap()["title"], "updated");
    }

    #[test]
    fn query_filters_by_type_and_slug() {
        let mut store = MemoryStore::new();
        store.create(post("post-a", "a")).unwrap();
        store.create(post("post-b", "b")).unwrap();
        store
            .create(json!({ "_id": "page-1", "_type": "page", "slug": "about" }))
            .unwrap();

        assert_eq!(store.query(&Query::of_type("post")).unwrap().len(), 2);
        assert_eq!(
            store
                .query(&Query::of_type("post").with_slug("b"))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.query(&Query::default()).unwrap().len(), 3);
    }

    #[test]
    fn patch_sets_only_named_fields() {
        let mut store = MemoryStore::new();
        store.create(post("post-a", "a")).unwrap();
        Patch::new("post-a")
            .set("excerpt", json!("short"))
            .commit(&mut store)
            .unwrap();
        let doc = store.get("post-a").unwrap();
        assert_eq!(doc["excerpt"], "short");
        assert_eq!(doc["title"], "a");
    }

    #[test]
    fn patch_unknown_id_is_not_found() {
        let mut store = MemoryStore::new();
        let err = Patch::new("post-missing")
            .set("x", json!(1))
            .commit(&mut store)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_removes_document() {
        let mut store = MemoryStore::new();
        store.create(post("post-a", "a")).unwrap();
        store.delete("post-a").unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete("post-a"),
            Err(StoreError::NotFound(_))
        ));
    }
}
