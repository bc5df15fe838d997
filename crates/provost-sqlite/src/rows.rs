//! Declarative row-to-entity mapping.
//!
//! One column-list const and one mapper per entity, shared by every
//! query of that entity, so a SELECT list cannot drift from the field
//! population that reads it. Timestamps are RFC 3339 text, which also
//! makes `expires <= now` comparisons order correctly as strings.

use chrono::{DateTime, Utc};
use provost_core::model::{Consumer, Context, ResourceLink, ResourceLinkOwner, ShareApproval, UserResult};
use provost_core::settings::Settings;
use rusqlite::Row;

pub(crate) const CONSUMER_COLUMNS: &str = "consumer_pk, name, consumer_key256, consumer_key, \
     secret, lti_version, consumer_name, consumer_version, consumer_guid, profile, tool_proxy, \
     settings, protected, enabled, enable_from, enable_until, last_access, created, updated";

pub(crate) const CONTEXT_COLUMNS: &str =
    "context_pk, consumer_pk, lti_context_id, settings, created, updated";

pub(crate) const RESOURCE_LINK_COLUMNS: &str = "resource_link_pk, context_pk, consumer_pk, \
     lti_resource_link_id, settings, primary_resource_link_pk, share_approved, created, updated";

pub(crate) const USER_RESULT_COLUMNS: &str =
    "user_pk, resource_link_pk, lti_user_id, lti_result_sourcedid, created, updated";

/// Prefix a shared column list with a table alias for joined queries.
pub(crate) fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(", ")
        .map(|column| format!("{alias}.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn ts(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn ts_column(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339())
}

pub(crate) fn consumer_from_row(row: &Row<'_>) -> rusqlite::Result<Consumer> {
    let key256: String = row.get(2)?;
    let raw_key: Option<String> = row.get(3)?;
    let profile: Option<String> = row.get(9)?;
    let settings: Option<String> = row.get(11)?;
    Ok(Consumer {
        record_id: Some(row.get(0)?),
        name: row.get(1)?,
        // the raw key is only stored when hashing changed it; otherwise
        // the lookup column is the key
        key: raw_key.unwrap_or(key256),
        secret: row.get(4)?,
        lti_version: row.get(5)?,
        consumer_name: row.get(6)?,
        consumer_version: row.get(7)?,
        consumer_guid: row.get(8)?,
        profile: profile.as_deref().and_then(|p| serde_json::from_str(p).ok()),
        tool_proxy: row.get(10)?,
        settings: Settings::decode(settings.as_deref()),
        protected: row.get::<_, i64>(12)? != 0,
        enabled: row.get::<_, i64>(13)? != 0,
        enable_from: ts(row.get(14)?),
        enable_until: ts(row.get(15)?),
        last_access: ts(row.get(16)?),
        created: ts(row.get(17)?),
        updated: ts(row.get(18)?),
    })
}

pub(crate) fn context_from_row(row: &Row<'_>) -> rusqlite::Result<Context> {
    let settings: Option<String> = row.get(3)?;
    Ok(Context {
        record_id: Some(row.get(0)?),
        consumer_id: Some(row.get(1)?),
        lti_context_id: row.get(2)?,
        settings: Settings::decode(settings.as_deref()),
        created: ts(row.get(4)?),
        updated: ts(row.get(5)?),
    })
}

pub(crate) fn resource_link_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceLink> {
    let context_id: Option<i64> = row.get(1)?;
    let consumer_id: Option<i64> = row.get(2)?;
    let settings: Option<String> = row.get(4)?;
    Ok(ResourceLink {
        record_id: Some(row.get(0)?),
        owner: ResourceLinkOwner::from_columns(context_id, consumer_id),
        lti_resource_link_id: row.get(3)?,
        settings: Settings::decode(settings.as_deref()),
        primary_resource_link_id: row.get(5)?,
        share_approved: ShareApproval::from_column(row.get(6)?),
        created: ts(row.get(7)?),
        updated: ts(row.get(8)?),
    })
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserResult> {
    Ok(UserResult {
        record_id: Some(row.get(0)?),
        resource_link_id: Some(row.get(1)?),
        lti_user_id: row.get(2)?,
        lti_result_sourcedid: row.get(3)?,
        created: ts(row.get(4)?),
        updated: ts(row.get(5)?),
    })
}
