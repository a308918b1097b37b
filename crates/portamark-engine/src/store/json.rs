//! Directory-of-JSON store, the CLI's stand-in document store.
//!
//! One pretty-printed `<id>.json` per document. Useful for dry runs and
//! for inspecting exactly what a batch would write to the real CMS.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{ContentStore, Query, StoreError, doc_id};

#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, path: &Path) -> Result<Value, StoreError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, id: &str, doc: &Value) -> Result<(), StoreError> {
        let pretty = serde_json::to_string_pretty(doc)?;
        fs::write(self.path_for(id), pretty + "\n")?;
        Ok(())
    }
}

impl ContentStore for JsonStore {
    fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut docs = Vec::new();
        for path in paths {
            let doc = self.read(&path)?;
            if query.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn create(&mut self, doc: Value) -> Result<String, StoreError> {
        let id = doc_id(&doc)?;
        if self.path_for(&id).exists() {
            return Err(StoreError::AlreadyExists(id));
        }
        self.write(&id, &doc)?;
        Ok(id)
    }

    fn create_or_replace(&mut self, doc: Value) -> Result<String, StoreError> {
        let id = doc_id(&doc)?;
        self.write(&id, &doc)?;
        Ok(id)
    }

    fn patch_set(&mut self, id: &str, fields: Map<String, Value>) -> Result<String, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let mut doc = self.read(&path)?;
        if let Value::Object(map) = &mut doc {
            for (field, value) in fields {
                map.insert(field, value);
            }
        }
        self.write(id, &doc)?;
        Ok(id.to_string())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
