//! The storage contract every backend must satisfy identically.
//!
//! Correctness here is a security property: a stale nonce must never
//! validate twice, and deleting a tenant must not leave orphaned
//! descendants reachable or grantable access. The trait spells out the
//! semantics; backends supply the statements.

use std::collections::HashMap;

use crate::errors::Result;
use crate::model::{
    Consumer, ConsumerNonce, Context, ResourceLink, ResourceLinkShare, ResourceLinkShareKey,
    UserResult,
};

/// Separator used when composing compound scoped user ids.
pub const ID_SCOPE_SEPARATOR: char = ':';

/// How user ids are qualified when a listing is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScope {
    /// The platform user id alone.
    IdOnly,
    /// Qualified by the consumer key.
    Global,
    /// Qualified by the consumer key and platform context id.
    Context,
    /// Qualified by the consumer key and platform resource-link id.
    Resource,
}

/// Coordinates of the queried resource link, used to derive compound
/// scoped ids. Shared users are reported under the queried link, so one
/// set of coordinates applies to the whole listing.
#[derive(Debug, Clone, Copy)]
pub struct ScopeCoordinates<'a> {
    pub consumer_key: &'a str,
    pub context_id: Option<&'a str>,
    pub resource_link_id: &'a str,
}

pub fn scoped_user_id(user: &UserResult, scope: IdScope, at: ScopeCoordinates<'_>) -> String {
    match scope {
        IdScope::IdOnly => user.lti_user_id.clone(),
        IdScope::Global => format!(
            "{}{ID_SCOPE_SEPARATOR}{}",
            at.consumer_key, user.lti_user_id
        ),
        IdScope::Context => format!(
            "{}{ID_SCOPE_SEPARATOR}{}{ID_SCOPE_SEPARATOR}{}",
            at.consumer_key,
            at.context_id.unwrap_or(""),
            user.lti_user_id
        ),
        IdScope::Resource => format!(
            "{}{ID_SCOPE_SEPARATOR}{}{ID_SCOPE_SEPARATOR}{}",
            at.consumer_key, at.resource_link_id, user.lti_user_id
        ),
    }
}

/// Project a user listing into a map keyed by scoped id. Collisions are
/// last-write-wins; each one is logged so the overwrite is observable
/// rather than silent.
pub fn key_user_results(
    users: Vec<UserResult>,
    scope: IdScope,
    at: ScopeCoordinates<'_>,
) -> HashMap<String, UserResult> {
    let mut keyed = HashMap::with_capacity(users.len());
    for user in users {
        let id = scoped_user_id(&user, scope, at);
        if keyed.insert(id.clone(), user).is_some() {
            tracing::warn!("scoped user id `{id}` collided; keeping the later row");
        }
    }
    keyed
}

/// Abstract data connector over a durable store.
///
/// Loads populate the passed entity and report found/not-found as a
/// boolean; not-found leaves the entity untouched. Saves upsert and stamp
/// backend-assigned ids and timestamps back onto the entity. Deletes
/// cascade child-before-parent as one unit of work and reset the entity
/// on success.
pub trait DataConnector {
    /// Resolve a consumer by record id when set, else by hashed key. A
    /// stored raw key must equal the caller's key exactly, which rejects
    /// digest collisions on the lookup column.
    fn load_consumer(&self, consumer: &mut Consumer) -> Result<bool>;

    /// Upsert keyed on id presence. Refreshes `updated` (and `created`
    /// plus the new id on insert) to one wall-clock instant.
    fn save_consumer(&self, consumer: &mut Consumer) -> Result<()>;

    /// Transitively remove every context, resource link, user, nonce and
    /// share key the consumer owns, and detach (never delete) foreign
    /// secondaries whose primary points into this consumer's links. One
    /// transactional unit: a partial cascade must not commit.
    fn delete_consumer(&self, consumer: &mut Consumer) -> Result<()>;

    /// All consumers, ordered by display name.
    fn list_consumers(&self) -> Result<Vec<Consumer>>;

    /// Resolve by record id, else by (owning consumer, platform context
    /// id).
    fn load_context(&self, context: &mut Context) -> Result<bool>;

    fn save_context(&self, context: &mut Context) -> Result<()>;

    /// Cascade one level down: share keys, users, detach foreign
    /// secondaries, links, then the context row.
    fn delete_context(&self, context: &mut Context) -> Result<()>;

    /// Resolve with precedence: record id; then (owning context, platform
    /// link id); then (owning consumer, platform link id) searched over
    /// direct consumer ownership OR ownership via any of that consumer's
    /// contexts.
    fn load_resource_link(&self, link: &mut ResourceLink) -> Result<bool>;

    /// Upsert. Ownership columns derive from the owner variant; an
    /// update matches on the ownership column authoritative for the
    /// entity, so a row can never be silently reassigned to another
    /// parent.
    fn save_resource_link(&self, link: &mut ResourceLink) -> Result<()>;

    fn delete_resource_link(&self, link: &mut ResourceLink) -> Result<()>;

    /// Users attached to this link. `local_only` restricts to direct
    /// members (and only applies while the link is not itself a
    /// secondary); otherwise the union adds users of every secondary
    /// whose share is approved, and only those.
    fn user_results(&self, link: &ResourceLink, local_only: bool) -> Result<Vec<UserResult>>;

    /// Every link naming this one as primary, ordered by owning
    /// consumer, with its approval flag.
    fn shares(&self, link: &ResourceLink) -> Result<Vec<ResourceLinkShare>>;

    /// Sweep expired nonces (all consumers), then report whether this
    /// (consumer, value) pair has been seen. Presence means replay. A
    /// failing sweep is logged and does not block the check.
    fn load_nonce(&self, nonce: &ConsumerNonce) -> Result<bool>;

    /// Record first use. Atomic insert-if-absent: a duplicate surfaces as
    /// `StoreError::Constraint` and must be treated as a replay, never
    /// swallowed.
    fn save_nonce(&self, nonce: &ConsumerNonce) -> Result<()>;

    /// Idempotent expiry sweep, also invocable by an external scheduler.
    /// Returns the number of rows purged.
    fn purge_nonces(&self) -> Result<usize>;

    /// Sweep expired share keys, then resolve by id. A stored target
    /// link that differs from the entity's `resource_link_id` is treated
    /// as not-found: a key presented against the wrong link grants
    /// nothing.
    fn load_share_key(&self, share_key: &mut ResourceLinkShareKey) -> Result<bool>;

    /// Plain insert; the id is caller-supplied and a duplicate surfaces
    /// as `StoreError::Constraint`.
    fn save_share_key(&self, share_key: &ResourceLinkShareKey) -> Result<()>;

    fn delete_share_key(&self, share_key: &mut ResourceLinkShareKey) -> Result<()>;

    /// Idempotent expiry sweep. Returns the number of rows purged.
    fn purge_share_keys(&self) -> Result<usize>;

    /// Resolve by record id, else by (resource link, platform user id)
    /// under id-only scope.
    fn load_user(&self, user: &mut UserResult) -> Result<bool>;

    /// INSERT when the entity has never been persisted (`created` is
    /// unset), else UPDATE of the outcome sourced id only.
    fn save_user(&self, user: &mut UserResult) -> Result<()>;

    fn delete_user(&self, user: &mut UserResult) -> Result<()>;
}
