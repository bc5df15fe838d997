//! The trust-relationship entities a tool provider tracks across
//! launches: consumers, their contexts, resource links, users, and the
//! replay-protection tokens.
//!
//! Entities are plain records. Record ids and timestamps are assigned by
//! the backend on save; `delete` returns an entity to its unpersisted
//! state while keeping the platform-supplied identifiers it was built
//! with.

mod consumer;
mod context;
mod resource_link;
mod tokens;
mod user;

pub use consumer::Consumer;
pub use context::Context;
pub use resource_link::{ResourceLink, ResourceLinkOwner, ResourceLinkShare, ShareApproval};
pub use tokens::{ConsumerNonce, ResourceLinkShareKey};
pub use user::UserResult;
