//! Consumer read/write boundary: lookup by id or hashed key, canonical
//! raw-key persistence, and the full tenant cascade.

use chrono::{DateTime, Utc};
use provost_core::errors::Result;
use provost_core::key;
use provost_core::model::Consumer;
use rusqlite::{params, Connection, OptionalExtension};

use super::{sql_err, CascadeStep};
use crate::rows::{consumer_from_row, ts_column, CONSUMER_COLUMNS};

pub(crate) fn load(conn: &Connection, consumer: &mut Consumer) -> Result<bool> {
    let row = if let Some(id) = consumer.record_id {
        let sql = format!("SELECT {CONSUMER_COLUMNS} FROM lti_consumer WHERE consumer_pk = ?1");
        conn.query_row(&sql, params![id], consumer_from_row)
            .optional()
            .map_err(sql_err)?
    } else {
        // The raw-key equality rejects rows whose hashed lookup column
        // merely collides with the caller's key.
        let sql = format!(
            "SELECT {CONSUMER_COLUMNS} FROM lti_consumer \
             WHERE consumer_key256 = ?1 AND (consumer_key IS NULL OR consumer_key = ?2)"
        );
        let key256 = key::lookup_key(&consumer.key);
        conn.query_row(&sql, params![key256, consumer.key], consumer_from_row)
            .optional()
            .map_err(sql_err)?
    };

    match row {
        Some(found) => {
            *consumer = found;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn save(conn: &Connection, consumer: &mut Consumer, now: DateTime<Utc>) -> Result<()> {
    let key256 = key::lookup_key(&consumer.key);
    let raw_key = key::raw_key_column(&consumer.key);
    let profile = consumer.profile.as_ref().map(|p| p.to_string());
    let settings = consumer.settings.encode();
    let now_text = now.to_rfc3339();

    if let Some(id) = consumer.record_id {
        conn.execute(
            "UPDATE lti_consumer SET consumer_key256 = ?1, consumer_key = ?2, name = ?3, \
             secret = ?4, lti_version = ?5, consumer_name = ?6, consumer_version = ?7, \
             consumer_guid = ?8, profile = ?9, tool_proxy = ?10, settings = ?11, \
             protected = ?12, enabled = ?13, enable_from = ?14, enable_until = ?15, \
             last_access = ?16, updated = ?17 WHERE consumer_pk = ?18",
            params![
                key256,
                raw_key,
                consumer.name,
                consumer.secret,
                consumer.lti_version,
                consumer.consumer_name,
                consumer.consumer_version,
                consumer.consumer_guid,
                profile,
                consumer.tool_proxy,
                settings,
                consumer.protected as i64,
                consumer.enabled as i64,
                ts_column(consumer.enable_from),
                ts_column(consumer.enable_until),
                ts_column(consumer.last_access),
                now_text,
                id,
            ],
        )
        .map_err(sql_err)?;
    } else {
        conn.execute(
            "INSERT INTO lti_consumer (consumer_key256, consumer_key, name, secret, \
             lti_version, consumer_name, consumer_version, consumer_guid, profile, tool_proxy, \
             settings, protected, enabled, enable_from, enable_until, last_access, created, \
             updated) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, \
             ?15, ?16, ?17, ?18)",
            params![
                key256,
                raw_key,
                consumer.name,
                consumer.secret,
                consumer.lti_version,
                consumer.consumer_name,
                consumer.consumer_version,
                consumer.consumer_guid,
                profile,
                consumer.tool_proxy,
                settings,
                consumer.protected as i64,
                consumer.enabled as i64,
                ts_column(consumer.enable_from),
                ts_column(consumer.enable_until),
                ts_column(consumer.last_access),
                now_text,
                now_text,
            ],
        )
        .map_err(sql_err)?;
        consumer.record_id = Some(conn.last_insert_rowid());
        consumer.created = Some(now);
    }
    consumer.updated = Some(now);
    Ok(())
}

pub(crate) fn list(conn: &Connection) -> Result<Vec<Consumer>> {
    let sql = format!("SELECT {CONSUMER_COLUMNS} FROM lti_consumer ORDER BY name");
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt.query_map([], consumer_from_row).map_err(sql_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sql_err)
}

/// Tenant cascade, child before parent. Foreign secondaries pointing at
/// any of this consumer's links are detached, not deleted: another
/// tenant's placement survives, it just stops sharing a roster that no
/// longer exists.
pub(crate) const DELETE_STEPS: &[CascadeStep] = &[
    (
        "nonces",
        "DELETE FROM lti_nonce WHERE consumer_pk = ?1",
    ),
    (
        "share keys of direct links",
        "DELETE FROM lti_share_key WHERE resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE consumer_pk = ?1)",
    ),
    (
        "share keys of context links",
        "DELETE FROM lti_share_key WHERE resource_link_pk IN \
         (SELECT rl.resource_link_pk FROM lti_resource_link rl \
          JOIN lti_context c ON rl.context_pk = c.context_pk WHERE c.consumer_pk = ?1)",
    ),
    (
        "users of direct links",
        "DELETE FROM lti_user_result WHERE resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE consumer_pk = ?1)",
    ),
    (
        "users of context links",
        "DELETE FROM lti_user_result WHERE resource_link_pk IN \
         (SELECT rl.resource_link_pk FROM lti_resource_link rl \
          JOIN lti_context c ON rl.context_pk = c.context_pk WHERE c.consumer_pk = ?1)",
    ),
    (
        "detach shares of direct links",
        "UPDATE lti_resource_link SET primary_resource_link_pk = NULL, share_approved = NULL \
         WHERE primary_resource_link_pk IN \
         (SELECT resource_link_pk FROM lti_resource_link WHERE consumer_pk = ?1)",
    ),
    (
        "detach shares of context links",
        "UPDATE lti_resource_link SET primary_resource_link_pk = NULL, share_approved = NULL \
         WHERE primary_resource_link_pk IN \
         (SELECT rl.resource_link_pk FROM lti_resource_link rl \
          JOIN lti_context c ON rl.context_pk = c.context_pk WHERE c.consumer_pk = ?1)",
    ),
    (
        "direct resource links",
        "DELETE FROM lti_resource_link WHERE consumer_pk = ?1",
    ),
    (
        "context resource links",
        "DELETE FROM lti_resource_link WHERE context_pk IN \
         (SELECT context_pk FROM lti_context WHERE consumer_pk = ?1)",
    ),
    (
        "contexts",
        "DELETE FROM lti_context WHERE consumer_pk = ?1",
    ),
    (
        "consumer",
        "DELETE FROM lti_consumer WHERE consumer_pk = ?1",
    ),
];
