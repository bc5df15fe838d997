//! Error taxonomy shared by every storage backend.
//!
//! Not-found is never an error: loads report it as `Ok(false)` so callers
//! can treat "no such row" as an ordinary trust decision. Errors are
//! reserved for violated constraints and for the storage engine itself.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or input constraint was violated: duplicate nonce,
    /// duplicate share-key id, or a save/delete of an incomplete entity.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A cascade step failed partway. The whole unit of work has been
    /// rolled back; a committed partial cascade would be a data-integrity
    /// defect, not a recoverable condition.
    #[error("cascade step `{step}` failed: {source}")]
    Consistency {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The storage engine itself failed (connection, syntax, aborted
    /// transaction). Diagnostics are kept for operator logs and must not
    /// feed the trust decision.
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        StoreError::Backend(err.into())
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}
