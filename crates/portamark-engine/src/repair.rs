//! Key annotation / tree repair pass.
//!
//! Documents round-tripped through the store can come back damaged by
//! earlier importer bugs: array elements missing their `_key`, and `null`
//! entries inside `markDefs` arrays. Neither is treated as a failure: this
//! pass is where that corruption is expected, fixed and counted.
//!
//! The pass is idempotent and never alters `text` or any other
//! user-visible field; its only mutations are key insertion and null
//! removal, both required by the store's array-diffing contract.

use serde_json::{Map, Value};
use tracing::debug;

use crate::keys::KeyGen;

/// Safety bound for the recursive traversal. Documents are trees, not
/// graphs, so this guards against malformed deeply nested data rather than
/// enabling any feature.
pub const MAX_REPAIR_DEPTH: u8 = 10;

/// Elements of this `_type` live in arrays but are exempt from the key
/// requirement (plain text leaf containers in the rich-text schema).
const NO_KEY_NEEDED_TYPE: &str = "text";

/// What a repair run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub keys_added: usize,
    pub null_mark_defs_removed: usize,
    /// Whether the document serializes differently than before the pass;
    /// the "needed fixing" predicate.
    pub changed: bool,
}

/// Repairs a document in its wire form.
pub fn repair_document(doc: &mut Value) -> RepairReport {
    let before = doc.to_string();
    let mut report = RepairReport::default();
    let mut keys = KeyGen::new();

    walk(doc, 0, &mut report, &mut keys);

    report.changed = doc.to_string() != before;
    if report.changed {
        debug!(
            keys_added = report.keys_added,
            null_mark_defs_removed = report.null_mark_defs_removed,
            "document repaired"
        );
    }
    report
}

fn walk(value: &mut Value, depth: u8, report: &mut RepairReport, keys: &mut KeyGen) {
    if depth >= MAX_REPAIR_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => walk_object(map, depth, report, keys),
        Value::Array(items) => walk_array(items, depth, report, keys),
        _ => {}
    }
}

fn walk_object(map: &mut Map<String, Value>, depth: u8, report: &mut RepairReport, keys: &mut KeyGen) {
    for (name, child) in map.iter_mut() {
        // markDefs arrays are the observed corruption site for null
        // entries; strip those before any key assignment below.
        if name == "markDefs"
            && let Value::Array(defs) = child
        {
            let before = defs.len();
            defs.retain(|d| !d.is_null());
            report.null_mark_defs_removed += before - defs.len();
        }
        walk(child, depth + 1, report, keys);
    }
}

fn walk_array(items: &mut [Value], depth: u8, report: &mut RepairReport, keys: &mut KeyGen) {
    for (index, item) in items.iter_mut().enumerate() {
        if let Value::Object(obj) = item
            && needs_key(obj)
        {
            let prefix = obj
                .get("_type")
                .and_then(Value::as_str)
                .unwrap_or("item")
                .to_string();
            obj.insert(
                "_key".to_string(),
                Value::String(keys.next_indexed(&prefix, index)),
            );
            report.keys_added += 1;
        }
        walk(item, depth + 1, report, keys);
    }
}

fn needs_key(obj: &Map<String, Value>) -> bool {
    if obj.get("_type").and_then(Value::as_str) == Some(NO_KEY_NEEDED_TYPE) {
        return false;
    }
    !matches!(obj.get("_key"), Some(Value::String(key)) if !key.is_empty())
}
