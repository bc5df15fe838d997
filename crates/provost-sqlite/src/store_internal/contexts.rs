//! Context read/write boundary and the per-context cascade.

use chrono::{DateTime, Utc};
use provost_core::errors::{Result, StoreError};
use provost_core::model::Context;
use rusqlite::{params, Connection, OptionalExtension};

use super::{sql_err, CascadeStep};
use crate::rows::{context_from_row, CONTEXT_COLUMNS};

pub(crate) fn load(conn: &Connection, context: &mut Context) -> Result<bool> {
    let row = if let Some(id) = context.record_id {
        let sql = format!("SELECT {CONTEXT_COLUMNS} FROM lti_context WHERE context_pk = ?1");
        conn.query_row(&sql, params![id], context_from_row)
            .optional()
            .map_err(sql_err)?
    } else {
        let consumer_id = context.consumer_id.ok_or_else(|| {
            StoreError::Constraint(
                "context load requires a record id or an owning consumer".to_string(),
            )
        })?;
        let sql = format!(
            "SELECT {CONTEXT_COLUMNS} FROM lti_context \
             WHERE consumer_pk = ?1 AND lti_context_id = ?2"
        );
        conn.query_row(&sql, params![consumer_id, context.lti_context_id], context_from_row)
            .optional()
            .map_err(sql_err)?
    };

    match row {
        Some(found) => {
            *context = found;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn save(conn: &Connection, context: &mut Context, now: DateTime<Utc>) -> Result<()> {
    let consumer_id = context.consumer_id.ok_or_else(|| {
        StoreError::Constraint("context save requires an owning consumer".to_string())
    })?;
    let settings = context.settings.encode();
    let now_text = now.to_rfc3339();

    if let Some(id) = context.record_id {
        conn.execute(
            "UPDATE lti_context SET lti_context_id = ?1, settings = ?2, updated = ?3 \
             WHERE consumer_pk = ?4 AND context_pk = ?5",
            params![context.lti_context_id, settings, now_text, consumer_id, id],
        )
        .map_err(sql_err)?;
    } else {
        conn.execute(
            "INSERT INTO lti_context (consumer_pk, lti_context_id, settings, created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![consumer_id, context.lti_context_id, settings, now_text, now_text],
        )
        .map_err(sql_err)?;
        context.record_id = Some(conn.last_insert_rowid());
        context.created = Some(now);
    }
    context.updated = Some(now);
    Ok(())
}

/// Context cascade, child before parent.
pub(crate) const DELETE_STEPS: &[CascadeStep] = &[
    (
        "share keys",
        "DELETE FROM lti_share_key WHERE resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE context_pk = ?1)",
    ),
    (
        "users",
        "DELETE FROM lti_user_result WHERE resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE context_pk = ?1)",
    ),
    (
        "detach shares",
        "UPDATE lti_resource_link SET primary_resource_link_pk = NULL, share_approved = NULL \
         WHERE primary_resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE context_pk = ?1)",
    ),
    (
        "resource links",
        "DELETE FROM lti_resource_link WHERE context_pk = ?1",
    ),
    (
        "context",
        "DELETE FROM lti_context WHERE context_pk = ?1",
    ),
];
