//! Resource-link read/write boundary: the three lookup modes, ownership
//! handling on save, the sharing graph queries, and the link cascade.

use chrono::{DateTime, Utc};
use provost_core::errors::{Result, StoreError};
use provost_core::model::{ResourceLink, ResourceLinkOwner, ResourceLinkShare, ShareApproval, UserResult};
use rusqlite::{params, Connection, OptionalExtension};

use super::{sql_err, CascadeStep};
use crate::rows::{
    qualified, resource_link_from_row, user_from_row, RESOURCE_LINK_COLUMNS, USER_RESULT_COLUMNS,
};

pub(crate) fn load(conn: &Connection, link: &mut ResourceLink) -> Result<bool> {
    let row = if let Some(id) = link.record_id {
        let sql = format!(
            "SELECT {RESOURCE_LINK_COLUMNS} FROM lti_resource_link WHERE resource_link_pk = ?1"
        );
        conn.query_row(&sql, params![id], resource_link_from_row)
            .optional()
            .map_err(sql_err)?
    } else {
        match link.owner {
            Some(ResourceLinkOwner::Context(context_id)) => {
                let sql = format!(
                    "SELECT {RESOURCE_LINK_COLUMNS} FROM lti_resource_link \
                     WHERE context_pk = ?1 AND lti_resource_link_id = ?2"
                );
                conn.query_row(
                    &sql,
                    params![context_id, link.lti_resource_link_id],
                    resource_link_from_row,
                )
                .optional()
                .map_err(sql_err)?
            }
            Some(ResourceLinkOwner::Consumer(consumer_id)) => {
                // A link may hang off the consumer directly or off any of
                // its contexts; the search is an inclusive OR over both.
                let sql = format!(
                    "SELECT {} FROM lti_resource_link r \
                     LEFT OUTER JOIN lti_context c ON r.context_pk = c.context_pk \
                     WHERE (r.consumer_pk = ?1 OR c.consumer_pk = ?1) \
                     AND r.lti_resource_link_id = ?2",
                    qualified(RESOURCE_LINK_COLUMNS, "r")
                );
                conn.query_row(
                    &sql,
                    params![consumer_id, link.lti_resource_link_id],
                    resource_link_from_row,
                )
                .optional()
                .map_err(sql_err)?
            }
            None => {
                return Err(StoreError::Constraint(
                    "resource link load requires a record id or an owner".to_string(),
                ))
            }
        }
    };

    match row {
        Some(found) => {
            *link = found;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn save(conn: &Connection, link: &mut ResourceLink, now: DateTime<Utc>) -> Result<()> {
    let owner = link.owner.ok_or_else(|| {
        StoreError::Constraint("resource link save requires an owner".to_string())
    })?;

    if let Some(primary_id) = link.primary_resource_link_id {
        ensure_primary_is_not_secondary(conn, primary_id)?;
    }

    let settings = link.settings.encode();
    // approval is meaningful only while a primary reference exists
    let approved = if link.primary_resource_link_id.is_some() {
        link.share_approved.to_column()
    } else {
        None
    };
    let now_text = now.to_rfc3339();

    if let Some(id) = link.record_id {
        // The WHERE clause matches on the ownership column that is
        // authoritative for this entity: an update can never silently
        // move a row under another parent.
        let affected = match owner {
            ResourceLinkOwner::Context(context_id) => conn
                .execute(
                    "UPDATE lti_resource_link SET consumer_pk = NULL, \
                     lti_resource_link_id = ?1, settings = ?2, primary_resource_link_pk = ?3, \
                     share_approved = ?4, updated = ?5 \
                     WHERE context_pk = ?6 AND resource_link_pk = ?7",
                    params![
                        link.lti_resource_link_id,
                        settings,
                        link.primary_resource_link_id,
                        approved,
                        now_text,
                        context_id,
                        id,
                    ],
                )
                .map_err(sql_err)?,
            ResourceLinkOwner::Consumer(consumer_id) => conn
                .execute(
                    "UPDATE lti_resource_link SET context_pk = NULL, \
                     lti_resource_link_id = ?1, settings = ?2, primary_resource_link_pk = ?3, \
                     share_approved = ?4, updated = ?5 \
                     WHERE consumer_pk = ?6 AND resource_link_pk = ?7",
                    params![
                        link.lti_resource_link_id,
                        settings,
                        link.primary_resource_link_id,
                        approved,
                        now_text,
                        consumer_id,
                        id,
                    ],
                )
                .map_err(sql_err)?,
        };
        if affected == 0 {
            return Err(StoreError::Constraint(
                "resource link update matched no row for its owner".to_string(),
            ));
        }
    } else {
        conn.execute(
            "INSERT INTO lti_resource_link (consumer_pk, context_pk, lti_resource_link_id, \
             settings, primary_resource_link_pk, share_approved, created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                owner.consumer_column(),
                owner.context_column(),
                link.lti_resource_link_id,
                settings,
                link.primary_resource_link_id,
                approved,
                now_text,
                now_text,
            ],
        )
        .map_err(sql_err)?;
        link.record_id = Some(conn.last_insert_rowid());
        link.created = Some(now);
    }
    link.updated = Some(now);
    Ok(())
}

/// Sharing never chains: the target of a primary reference must not
/// itself be a secondary.
fn ensure_primary_is_not_secondary(conn: &Connection, primary_id: i64) -> Result<()> {
    let primary_of_target: Option<Option<i64>> = conn
        .query_row(
            "SELECT primary_resource_link_pk FROM lti_resource_link WHERE resource_link_pk = ?1",
            params![primary_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(sql_err)?;
    match primary_of_target {
        None => Err(StoreError::Constraint(format!(
            "primary resource link {primary_id} does not exist"
        ))),
        Some(Some(_)) => Err(StoreError::Constraint(format!(
            "resource link {primary_id} is itself a secondary and cannot act as a primary"
        ))),
        Some(None) => Ok(()),
    }
}

pub(crate) fn user_results(
    conn: &Connection,
    link_id: i64,
    local_only: bool,
) -> Result<Vec<UserResult>> {
    let base = format!(
        "SELECT {} FROM lti_user_result u \
         JOIN lti_resource_link rl ON u.resource_link_pk = rl.resource_link_pk",
        qualified(USER_RESULT_COLUMNS, "u")
    );
    // `local_only` applies only while the link is not itself a secondary;
    // the union variant adds users of approved secondaries, and no others.
    let sql = if local_only {
        format!(
            "{base} WHERE rl.resource_link_pk = ?1 AND rl.primary_resource_link_pk IS NULL"
        )
    } else {
        format!(
            "{base} WHERE (rl.resource_link_pk = ?1 AND rl.primary_resource_link_pk IS NULL) \
             OR (rl.primary_resource_link_pk = ?1 AND rl.share_approved = 1)"
        )
    };
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt.query_map(params![link_id], user_from_row).map_err(sql_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sql_err)
}

pub(crate) fn shares(conn: &Connection, link_id: i64) -> Result<Vec<ResourceLinkShare>> {
    let mut stmt = conn
        .prepare(
            "SELECT resource_link_pk, consumer_pk, share_approved FROM lti_resource_link \
             WHERE primary_resource_link_pk = ?1 ORDER BY consumer_pk",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![link_id], |row| {
            Ok(ResourceLinkShare {
                resource_link_id: row.get(0)?,
                consumer_id: row.get(1)?,
                approved: ShareApproval::from_column(row.get(2)?),
            })
        })
        .map_err(sql_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sql_err)
}

/// Link cascade: its invitations, its roster, then detach anyone sharing
/// it, then the row itself.
pub(crate) const DELETE_STEPS: &[CascadeStep] = &[
    (
        "share keys",
        "DELETE FROM lti_share_key WHERE resource_link_pk = ?1",
    ),
    (
        "users",
        "DELETE FROM lti_user_result WHERE resource_link_pk = ?1",
    ),
    (
        "detach shares",
        "UPDATE lti_resource_link SET primary_resource_link_pk = NULL, share_approved = NULL \
         WHERE primary_resource_link_pk = ?1",
    ),
    (
        "resource link",
        "DELETE FROM lti_resource_link WHERE resource_link_pk = ?1",
    ),
];
