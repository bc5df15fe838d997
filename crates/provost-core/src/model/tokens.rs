use chrono::{DateTime, Utc};

/// A one-time launch token scoped to a consumer. The (consumer, value)
/// pair is usable as proof-of-first-use exactly once within its validity
/// window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerNonce {
    pub consumer_id: i64,
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl ConsumerNonce {
    pub fn new(consumer_id: i64, value: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            consumer_id,
            value: value.into(),
            expires,
        }
    }
}

/// A short-lived invitation token authorizing a secondary resource link
/// to attach to a primary one. The id is caller-supplied (it travels to
/// the other platform out of band), not backend-generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLinkShareKey {
    pub share_key_id: String,
    pub resource_link_id: i64,
    /// When set, a share established with this key skips the manual
    /// approval step.
    pub auto_approve: bool,
    /// `None` only on an entity that has never been saved or was reset;
    /// saving without an expiry is a constraint violation.
    pub expires: Option<DateTime<Utc>>,
}

impl ResourceLinkShareKey {
    pub fn new(share_key_id: impl Into<String>, resource_link_id: i64) -> Self {
        Self {
            share_key_id: share_key_id.into(),
            resource_link_id,
            auto_approve: false,
            expires: None,
        }
    }

    /// Return to the unpersisted state; the id and target link survive.
    pub fn reset(&mut self) {
        self.auto_approve = false;
        self.expires = None;
    }
}
