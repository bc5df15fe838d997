use chrono::{DateTime, Utc};

/// An end-user's participation in one resource link, together with the
/// sourced id used to report outcomes back to the platform. Unique per
/// (resource link, platform user id).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserResult {
    pub record_id: Option<i64>,
    pub resource_link_id: Option<i64>,
    pub lti_user_id: String,
    pub lti_result_sourcedid: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl UserResult {
    pub fn new(resource_link_id: i64, lti_user_id: impl Into<String>) -> Self {
        Self {
            resource_link_id: Some(resource_link_id),
            lti_user_id: lti_user_id.into(),
            ..Self::default()
        }
    }

    pub fn by_record_id(record_id: i64) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    /// An entity is new until its first successful save stamps `created`.
    /// Id presence is not the signal: a loaded row carries both, and an
    /// entity reset after delete carries neither.
    pub fn is_new(&self) -> bool {
        self.created.is_none()
    }

    /// Return to the unpersisted state; ownership and the platform id
    /// survive.
    pub fn reset(&mut self) {
        *self = Self {
            resource_link_id: self.resource_link_id,
            lti_user_id: std::mem::take(&mut self.lti_user_id),
            ..Self::default()
        };
    }
}
