//! User-result read/write boundary.

use chrono::{DateTime, Utc};
use provost_core::errors::{Result, StoreError};
use provost_core::model::UserResult;
use rusqlite::{params, Connection, OptionalExtension};

use super::sql_err;
use crate::rows::{user_from_row, USER_RESULT_COLUMNS};

pub(crate) fn load(conn: &Connection, user: &mut UserResult) -> Result<bool> {
    let row = if let Some(id) = user.record_id {
        let sql = format!("SELECT {USER_RESULT_COLUMNS} FROM lti_user_result WHERE user_pk = ?1");
        conn.query_row(&sql, params![id], user_from_row)
            .optional()
            .map_err(sql_err)?
    } else {
        let link_id = user.resource_link_id.ok_or_else(|| {
            StoreError::Constraint(
                "user load requires a record id or an owning resource link".to_string(),
            )
        })?;
        let sql = format!(
            "SELECT {USER_RESULT_COLUMNS} FROM lti_user_result \
             WHERE resource_link_pk = ?1 AND lti_user_id = ?2"
        );
        conn.query_row(&sql, params![link_id, user.lti_user_id], user_from_row)
            .optional()
            .map_err(sql_err)?
    };

    match row {
        Some(found) => {
            *user = found;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn save(conn: &Connection, user: &mut UserResult, now: DateTime<Utc>) -> Result<()> {
    let now_text = now.to_rfc3339();
    // "never persisted" is tracked by the missing creation stamp, not by
    // id presence; an update touches the outcome sourced id only
    if user.is_new() {
        let link_id = user.resource_link_id.ok_or_else(|| {
            StoreError::Constraint("user save requires an owning resource link".to_string())
        })?;
        conn.execute(
            "INSERT INTO lti_user_result (resource_link_pk, lti_user_id, lti_result_sourcedid, \
             created, updated) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![link_id, user.lti_user_id, user.lti_result_sourcedid, now_text, now_text],
        )
        .map_err(sql_err)?;
        user.record_id = Some(conn.last_insert_rowid());
        user.created = Some(now);
    } else {
        let id = user.record_id.ok_or_else(|| {
            StoreError::Constraint("persisted user has no record id".to_string())
        })?;
        conn.execute(
            "UPDATE lti_user_result SET lti_result_sourcedid = ?1, updated = ?2 WHERE user_pk = ?3",
            params![user.lti_result_sourcedid, now_text, id],
        )
        .map_err(sql_err)?;
    }
    user.updated = Some(now);
    Ok(())
}

pub(crate) fn delete(conn: &Connection, user: &UserResult) -> Result<()> {
    let id = user
        .record_id
        .ok_or_else(|| StoreError::Constraint("user delete requires a record id".to_string()))?;
    conn.execute("DELETE FROM lti_user_result WHERE user_pk = ?1", params![id])
        .map_err(sql_err)?;
    Ok(())
}
