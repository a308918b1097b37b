//! Content store interface.
//!
//! The document store is an external collaborator; the pipeline only sees
//! this trait. Implementations are constructed explicitly and passed in
//! (one per batch run); there is no ambient process-wide client. Nothing
//! here assumes atomicity across documents.

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("document already exists: {0}")]
    AlreadyExists(String),
    #[error("document has no _id field")]
    MissingId,
    #[error("store directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Filter for [`ContentStore::query`], the GROQ-equivalent of the scripts'
/// fetch queries.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub doc_type: Option<String>,
    pub slug: Option<String>,
}

impl Query {
    pub fn of_type(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: Some(doc_type.into()),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Whether a document's wire form matches this filter.
    pub fn matches(&self, doc: &Value) -> bool {
        let type_ok = self
            .doc_type
            .as_deref()
            .is_none_or(|t| doc.get("_type").and_then(Value::as_str) == Some(t));
        let slug_ok = self
            .slug
            .as_deref()
            .is_none_or(|s| doc.get("slug").and_then(Value::as_str) == Some(s));
        type_ok && slug_ok
    }
}

/// Read/write surface of the document store.
pub trait ContentStore {
    /// All documents matching the filter, in stable id order.
    fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Creates a new document; fails if its `_id` already exists.
    fn create(&mut self, doc: Value) -> Result<String, StoreError>;

    /// Creates or overwrites the document with the payload's `_id`
    /// (idempotent upsert, the import path's write primitive).
    fn create_or_replace(&mut self, doc: Value) -> Result<String, StoreError>;

    /// Sets the given top-level fields on an existing document, leaving the
    /// rest untouched.
    fn patch_set(&mut self, id: &str, fields: Map<String, Value>) -> Result<String, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// Builder mirroring the store API's `patch(id).set(fields).commit()` chain.
#[derive(Debug, Clone)]
pub struct Patch {
    id: String,
    fields: Map<String, Value>,
}

impl Patch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn commit(self, store: &mut dyn ContentStore) -> Result<String, StoreError> {
        store.patch_set(&self.id, self.fields)
    }
}

/// Extracts the `_id` a write payload carries.
pub(crate) fn doc_id(doc: &Value) -> Result<String, StoreError> {
    doc.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(StoreError::MissingId)
}
