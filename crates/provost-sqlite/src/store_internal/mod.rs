//! Per-entity statement boundaries for the SQLite store.
//!
//! Each module owns one entity's SQL; `store.rs` owns locking and
//! transactions only. Cascades are ordered step lists executed through
//! [`run_cascade`] so the child-before-parent order is visible in one
//! place per entity.

pub(crate) mod consumers;
pub(crate) mod contexts;
pub(crate) mod nonces;
pub(crate) mod resource_links;
pub(crate) mod share_keys;
pub(crate) mod users;

use provost_core::errors::{Result, StoreError};
use rusqlite::params;

/// Map an engine error into the shared taxonomy: unique/primary-key
/// violations become `Constraint`, everything else stays opaque backend
/// diagnostics.
pub(crate) fn sql_err(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, ref message)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint(
                message
                    .clone()
                    .unwrap_or_else(|| "unique constraint violated".to_string()),
            )
        }
        other => StoreError::backend(other),
    }
}

/// One named statement of a cascade.
pub(crate) type CascadeStep = (&'static str, &'static str);

/// Execute an ordered cascade inside the caller's transaction. The first
/// failing step aborts the remainder; the caller drops the transaction,
/// which rolls the whole unit back.
pub(crate) fn run_cascade(
    tx: &rusqlite::Transaction<'_>,
    steps: &[CascadeStep],
    id: i64,
) -> Result<()> {
    for &(step, sql) in steps {
        tx.execute(sql, params![id]).map_err(|e| StoreError::Consistency {
            step,
            source: e.into(),
        })?;
    }
    Ok(())
}
