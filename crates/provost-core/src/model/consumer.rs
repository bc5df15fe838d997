use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::settings::Settings;

/// A consuming platform: the tenant root of the trust hierarchy.
///
/// Lookup authority is exactly one path at a time: the record id when the
/// entity has been persisted, otherwise the hashed form of `key`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consumer {
    pub record_id: Option<i64>,
    /// Raw shared key as presented by the platform.
    pub key: String,
    pub name: Option<String>,
    pub secret: Option<String>,
    pub lti_version: Option<String>,
    pub consumer_name: Option<String>,
    pub consumer_version: Option<String>,
    pub consumer_guid: Option<String>,
    /// Tool-consumer profile document, stored as opaque JSON.
    pub profile: Option<Value>,
    pub tool_proxy: Option<String>,
    pub settings: Settings,
    /// When set, key-lookup semantics are restricted to signed requests.
    pub protected: bool,
    pub enabled: bool,
    pub enable_from: Option<DateTime<Utc>>,
    pub enable_until: Option<DateTime<Utc>>,
    pub last_access: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Consumer {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn by_record_id(record_id: i64) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    /// Whether the enabled flag and the optional validity window admit a
    /// launch at `at`. The window is half-open: `enable_until` itself is
    /// already outside it.
    pub fn is_available(&self, at: DateTime<Utc>) -> bool {
        self.enabled
            && self.enable_from.map_or(true, |from| from <= at)
            && self.enable_until.map_or(true, |until| at < until)
    }

    /// Return to the unpersisted state; the key survives.
    pub fn reset(&mut self) {
        *self = Self {
            key: std::mem::take(&mut self.key),
            ..Self::default()
        };
    }
}
