//! Opaque per-entity settings blob.
//!
//! Consumers, contexts and resource links each carry a serialized
//! key-value map the storage layer never looks inside. The contract for
//! decoding is deliberately forgiving: an absent or malformed blob is the
//! empty map, never an error, so a corrupted settings column can not
//! block a launch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings(pub BTreeMap<String, Value>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode a stored blob; absence and parse failure both yield the
    /// empty map.
    pub fn decode(blob: Option<&str>) -> Self {
        blob.and_then(|raw| serde_json::from_str(raw).ok())
            .map(Settings)
            .unwrap_or_default()
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}
