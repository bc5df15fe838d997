//! Replay-protection boundary. The (consumer, value) primary key makes
//! `insert` the atomic insert-if-absent that closes the race between two
//! requests presenting the same nonce concurrently.

use chrono::{DateTime, Utc};
use provost_core::errors::Result;
use provost_core::model::ConsumerNonce;
use rusqlite::{params, Connection};

use super::sql_err;

/// Delete every expired nonce, for any consumer. Idempotent.
pub(crate) fn purge(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM lti_nonce WHERE expires <= ?1",
        params![now.to_rfc3339()],
    )
    .map_err(sql_err)
}

pub(crate) fn exists(conn: &Connection, nonce: &ConsumerNonce) -> Result<bool> {
    let mut stmt = conn
        .prepare("SELECT 1 FROM lti_nonce WHERE consumer_pk = ?1 AND value = ?2")
        .map_err(sql_err)?;
    stmt.exists(params![nonce.consumer_id, nonce.value])
        .map_err(sql_err)
}

pub(crate) fn insert(conn: &Connection, nonce: &ConsumerNonce) -> Result<()> {
    conn.execute(
        "INSERT INTO lti_nonce (consumer_pk, value, expires) VALUES (?1, ?2, ?3)",
        params![nonce.consumer_id, nonce.value, nonce.expires.to_rfc3339()],
    )
    .map_err(sql_err)?;
    Ok(())
}
