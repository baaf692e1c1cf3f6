//! Session-scoped registry of generated record types
//!
//! Record types are memoized by a canonical hash of their name and schema,
//! so identical nested objects seen across tools resolve to one shared
//! `Arc<RecordType>`. The registry lives as long as the session that owns it.

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::types::RecordType;

/// Memoizing registry of record types keyed by canonical schema hash
#[derive(Debug, Default)]
pub struct RecordRegistry {
    records: DashMap<String, Arc<RecordType>>,
}

impl RecordRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        RecordRegistry {
            records: DashMap::new(),
        }
    }

    /// Canonical key for a record name and its object schema.
    ///
    /// Object keys are fed in sorted order, so key order in the incoming
    /// JSON does not change the hash.
    pub fn key(name: &str, schema: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        feed_canonical(&mut hasher, schema);
        format!("{:x}", hasher.finalize())
    }

    /// Return the cached record for `name`/`schema`, building it on a miss.
    ///
    /// `build` runs outside any map lock so it may recurse into the
    /// registry for nested records.
    pub fn get_or_build<F>(&self, name: &str, schema: &Value, build: F) -> Arc<RecordType>
    where
        F: FnOnce() -> RecordType,
    {
        let key = Self::key(name, schema);
        if let Some(existing) = self.records.get(&key) {
            return Arc::clone(existing.value());
        }
        let built = Arc::new(build());
        Arc::clone(self.records.entry(key).or_insert(built).value())
    }

    /// Number of cached record types
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all cached record types
    pub fn clear(&self) {
        self.records.clear();
    }
}

fn feed_canonical(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(b) => hasher.update(if *b { b"t" } else { b"f" }),
        Value::Number(n) => {
            hasher.update(b"#");
            hasher.update(n.to_string().as_bytes());
        }
        Value::String(s) => {
            hasher.update(b"s");
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for item in items {
                feed_canonical(hasher, item);
            }
            hasher.update(b"]");
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for key in keys {
                hasher.update((key.len() as u64).to_le_bytes());
                hasher.update(key.as_bytes());
                feed_canonical(hasher, &map[key]);
            }
            hasher.update(b"}");
        }
    }
}
