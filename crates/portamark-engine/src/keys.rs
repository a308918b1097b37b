//! Key generation for array-dwelling nodes.
//!
//! The target CMS requires every element of every array in a document to
//! carry a `_key` that is unique within its containing array. Keys are used
//! for array diffing only; nothing downstream parses their structure, so the
//! encoding here is not load-bearing; only uniqueness-within-document and
//! stability-once-assigned matter.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Generates `_key` values for blocks, spans, mark definitions and other
/// array elements.
///
/// The default generator combines a type prefix, an epoch-millis component,
/// a per-generator counter and a random suffix. The [`KeyGen::deterministic`]
/// constructor swaps the time/random parts for a bare counter so tests can
/// assert on exact document shapes.
#[derive(Debug)]
pub struct KeyGen {
    counter: u64,
    deterministic: bool,
}

impl KeyGen {
    pub fn new() -> Self {
        Self {
            counter: 0,
            deterministic: false,
        }
    }

    /// Counter-only keys (`block-1`, `span-2`, ...) for tests.
    pub fn deterministic() -> Self {
        Self {
            counter: 0,
            deterministic: true,
        }
    }

    /// Next key with the given type-derived prefix.
    pub fn next(&mut self, prefix: &str) -> String {
        self.counter += 1;
        if self.deterministic {
            return format!("{prefix}-{}", self.counter);
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{prefix}-{millis}-{}-{}", self.counter, &suffix[..8])
    }

    /// Next key carrying the element's array index, used by the repair pass
    /// when re-keying elements fetched back from the CMS.
    pub fn next_indexed(&mut self, prefix: &str, index: usize) -> String {
        self.counter += 1;
        if self.deterministic {
            return format!("{prefix}-{index}-{}", self.counter);
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{prefix}-{millis}-{index}-{}", &suffix[..8])
    }
}

impl Default for KeyGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let mut keys = KeyGen::new();
        let mut seen = HashSet::new();
        for i in 0..1000 {
            assert!(seen.insert(keys.next("block")), "duplicate at {i}");
            assert!(seen.insert(keys.next_indexed("span", i)));
        }
    }

    #[test]
    fn deterministic_keys_are_stable() {
        let mut keys = KeyGen::deterministic();
        assert_eq!(keys.next("block"), "block-1");
        assert_eq!(keys.next("span"), "span-2");
        assert_eq!(keys.next_indexed("markDef", 3), "markDef-3-3");
    }

    #[test]
    fn keys_start_with_type_prefix() {
        let mut keys = KeyGen::new();
        assert!(keys.next("faq").starts_with("faq-"));
    }
}
