use chrono::{DateTime, Utc};

use crate::settings::Settings;

/// Which parent owns a launch point. A resource link belongs to a course
/// context or, for context-less placements, directly to the consumer.
/// The tagged union makes "never both" structural instead of a runtime
/// check over two nullable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLinkOwner {
    Consumer(i64),
    Context(i64),
}

impl ResourceLinkOwner {
    /// Decode from the two nullable ownership columns; context wins when
    /// a row carries both.
    pub fn from_columns(context_id: Option<i64>, consumer_id: Option<i64>) -> Option<Self> {
        match (context_id, consumer_id) {
            (Some(id), _) => Some(ResourceLinkOwner::Context(id)),
            (None, Some(id)) => Some(ResourceLinkOwner::Consumer(id)),
            (None, None) => None,
        }
    }

    pub fn consumer_column(&self) -> Option<i64> {
        match self {
            ResourceLinkOwner::Consumer(id) => Some(*id),
            ResourceLinkOwner::Context(_) => None,
        }
    }

    pub fn context_column(&self) -> Option<i64> {
        match self {
            ResourceLinkOwner::Context(id) => Some(*id),
            ResourceLinkOwner::Consumer(_) => None,
        }
    }
}

/// Share approval is tri-state: a share request exists before anyone has
/// ruled on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShareApproval {
    #[default]
    Unset,
    Approved,
    Rejected,
}

impl ShareApproval {
    /// Decode from a nullable integer column: NULL is unset, zero is
    /// rejected, anything else is approved.
    pub fn from_column(value: Option<i64>) -> Self {
        match value {
            None => ShareApproval::Unset,
            Some(0) => ShareApproval::Rejected,
            Some(_) => ShareApproval::Approved,
        }
    }

    pub fn to_column(self) -> Option<i64> {
        match self {
            ShareApproval::Unset => None,
            ShareApproval::Approved => Some(1),
            ShareApproval::Rejected => Some(0),
        }
    }

    pub fn is_approved(self) -> bool {
        self == ShareApproval::Approved
    }
}

/// A launch point. A link may share another link's roster by naming it as
/// primary; the approval flag gates that share and is meaningful only
/// while the primary reference is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLink {
    pub record_id: Option<i64>,
    pub lti_resource_link_id: String,
    pub owner: Option<ResourceLinkOwner>,
    pub settings: Settings,
    /// Record id of the link this one shares from. The target must not
    /// itself be a secondary: sharing never chains.
    pub primary_resource_link_id: Option<i64>,
    pub share_approved: ShareApproval,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl ResourceLink {
    pub fn new(owner: ResourceLinkOwner, lti_resource_link_id: impl Into<String>) -> Self {
        Self {
            owner: Some(owner),
            lti_resource_link_id: lti_resource_link_id.into(),
            ..Self::default()
        }
    }

    pub fn by_record_id(record_id: i64) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    /// True when this link reuses another link's roster.
    pub fn is_secondary(&self) -> bool {
        self.primary_resource_link_id.is_some()
    }

    /// Return to the unpersisted state; ownership and the platform id
    /// survive.
    pub fn reset(&mut self) {
        *self = Self {
            owner: self.owner,
            lti_resource_link_id: std::mem::take(&mut self.lti_resource_link_id),
            ..Self::default()
        };
    }
}

/// One secondary attached to a primary link, as returned by `shares`.
/// `consumer_id` is absent for secondaries owned through a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLinkShare {
    pub resource_link_id: i64,
    pub consumer_id: Option<i64>,
    pub approved: ShareApproval,
}
