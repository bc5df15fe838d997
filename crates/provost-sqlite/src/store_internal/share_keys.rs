//! Share-key boundary: caller-supplied ids, lazy expiry, and the
//! wrong-link defence on load.

use chrono::{DateTime, Utc};
use provost_core::errors::{Result, StoreError};
use provost_core::model::ResourceLinkShareKey;
use rusqlite::{params, Connection, OptionalExtension};

use super::sql_err;
use crate::rows::ts;

/// Delete every expired share key. Idempotent.
pub(crate) fn purge(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM lti_share_key WHERE expires <= ?1",
        params![now.to_rfc3339()],
    )
    .map_err(sql_err)
}

pub(crate) fn load(conn: &Connection, share_key: &mut ResourceLinkShareKey) -> Result<bool> {
    let row: Option<(i64, i64, Option<String>)> = conn
        .query_row(
            "SELECT resource_link_pk, auto_approve, expires FROM lti_share_key \
             WHERE share_key_id = ?1",
            params![share_key.share_key_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(sql_err)?;

    match row {
        // a key presented against the wrong resource link grants nothing,
        // so a target mismatch reads as absent
        Some((target, auto_approve, expires)) if target == share_key.resource_link_id => {
            share_key.auto_approve = auto_approve != 0;
            share_key.expires = ts(expires);
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(crate) fn insert(conn: &Connection, share_key: &ResourceLinkShareKey) -> Result<()> {
    let expires = share_key.expires.ok_or_else(|| {
        StoreError::Constraint("share key save requires an expiry".to_string())
    })?;
    conn.execute(
        "INSERT INTO lti_share_key (share_key_id, resource_link_pk, auto_approve, expires) \
         VALUES (?1, ?2, ?3, ?4)",
        params![
            share_key.share_key_id,
            share_key.resource_link_id,
            share_key.auto_approve as i64,
            expires.to_rfc3339(),
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub(crate) fn delete(conn: &Connection, share_key: &ResourceLinkShareKey) -> Result<()> {
    conn.execute(
        "DELETE FROM lti_share_key WHERE share_key_id = ?1",
        params![share_key.share_key_id],
    )
    .map_err(sql_err)?;
    Ok(())
}
