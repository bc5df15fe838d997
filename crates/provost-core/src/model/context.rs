use chrono::{DateTime, Utc};

use crate::settings::Settings;

/// A course or organizational unit scoped to exactly one consumer.
/// `lti_context_id` is the platform's identifier, unique per consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub record_id: Option<i64>,
    pub consumer_id: Option<i64>,
    pub lti_context_id: String,
    pub settings: Settings,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Context {
    pub fn new(consumer_id: i64, lti_context_id: impl Into<String>) -> Self {
        Self {
            consumer_id: Some(consumer_id),
            lti_context_id: lti_context_id.into(),
            ..Self::default()
        }
    }

    pub fn by_record_id(record_id: i64) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    /// Return to the unpersisted state; ownership and the platform id
    /// survive.
    pub fn reset(&mut self) {
        *self = Self {
            consumer_id: self.consumer_id,
            lti_context_id: std::mem::take(&mut self.lti_context_id),
            ..Self::default()
        };
    }
}
