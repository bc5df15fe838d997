use chrono::{TimeZone, Utc};
use provost_core::connector::DataConnector;
use provost_core::key;
use provost_core::model::Consumer;
use provost_sqlite::Store;
use rusqlite::params;

fn store() -> anyhow::Result<Store> {
    let store = Store::memory()?;
    store.init_schema()?;
    Ok(store)
}

fn full_consumer(consumer_key: &str) -> Consumer {
    let mut consumer = Consumer::new(consumer_key);
    consumer.name = Some("Moodle at Example".into());
    consumer.secret = Some("s3cret".into());
    consumer.lti_version = Some("LTI-1p0".into());
    consumer.consumer_name = Some("Moodle".into());
    consumer.consumer_version = Some("moodle-4.3".into());
    consumer.consumer_guid = Some("guid-1234".into());
    consumer.profile = Some(serde_json::json!({"capability_offered": ["basic-lti-launch-request"]}));
    consumer.tool_proxy = Some("proxy-doc".into());
    consumer.settings.set("custom.locale", "en_GB");
    consumer.protected = true;
    consumer.enabled = true;
    consumer.enable_from = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    consumer.enable_until = Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    consumer.last_access = Some(Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap());
    consumer
}

#[test]
fn save_then_load_by_key_roundtrips_every_field() -> anyhow::Result<()> {
    let store = store()?;
    let mut saved = full_consumer("moodle.example.org");
    store.save_consumer(&mut saved)?;
    assert!(saved.record_id.is_some());
    assert!(saved.created.is_some());
    assert_eq!(saved.created, saved.updated);

    let mut loaded = Consumer::new("moodle.example.org");
    assert!(store.load_consumer(&mut loaded)?);
    assert_eq!(loaded, saved);
    Ok(())
}

#[test]
fn load_by_record_id_wins_over_key() -> anyhow::Result<()> {
    let store = store()?;
    let mut saved = full_consumer("moodle.example.org");
    store.save_consumer(&mut saved)?;

    // a bogus key is ignored once the record id is known
    let mut loaded = Consumer::by_record_id(saved.record_id.unwrap());
    loaded.key = "something else".into();
    assert!(store.load_consumer(&mut loaded)?);
    assert_eq!(loaded.key, "moodle.example.org");
    Ok(())
}

#[test]
fn short_key_stores_no_redundant_raw_key() -> anyhow::Result<()> {
    let store = store()?;
    let mut consumer = full_consumer("short-key");
    store.save_consumer(&mut consumer)?;

    let conn = store.conn.lock().unwrap();
    let (key256, raw): (String, Option<String>) = conn.query_row(
        "SELECT consumer_key256, consumer_key FROM lti_consumer WHERE consumer_pk = ?1",
        params![consumer.record_id.unwrap()],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    assert_eq!(key256, "short-key");
    assert!(raw.is_none(), "the lookup column doubles as the key");
    Ok(())
}

#[test]
fn long_key_is_hashed_and_kept_verbatim() -> anyhow::Result<()> {
    let store = store()?;
    let long_key = "k".repeat(key::MAX_PLAIN_KEY_LEN + 45);
    let mut consumer = full_consumer(&long_key);
    store.save_consumer(&mut consumer)?;

    {
        let conn = store.conn.lock().unwrap();
        let (key256, raw): (String, Option<String>) = conn.query_row(
            "SELECT consumer_key256, consumer_key FROM lti_consumer WHERE consumer_pk = ?1",
            params![consumer.record_id.unwrap()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        assert!(key256.starts_with("sha512:"));
        assert_eq!(raw.as_deref(), Some(long_key.as_str()));
    }

    let mut loaded = Consumer::new(long_key.clone());
    assert!(store.load_consumer(&mut loaded)?);
    assert_eq!(loaded.key, long_key);
    Ok(())
}

#[test]
fn raw_key_mismatch_on_hashed_lookup_is_not_found() -> anyhow::Result<()> {
    let store = store()?;
    let long_key = "k".repeat(300);
    let mut consumer = full_consumer(&long_key);
    store.save_consumer(&mut consumer)?;

    // simulate a digest collision: same lookup column, different raw key
    {
        let conn = store.conn.lock().unwrap();
        conn.execute(
            "UPDATE lti_consumer SET consumer_key = ?1 WHERE consumer_pk = ?2",
            params!["someone-elses-key", consumer.record_id.unwrap()],
        )?;
    }

    let mut loaded = Consumer::new(long_key);
    assert!(!store.load_consumer(&mut loaded)?);
    assert!(loaded.record_id.is_none(), "a failed load must not populate the entity");
    Ok(())
}

#[test]
fn load_of_unknown_key_returns_false() -> anyhow::Result<()> {
    let store = store()?;
    let mut consumer = Consumer::new("nobody");
    assert!(!store.load_consumer(&mut consumer)?);
    Ok(())
}

#[test]
fn update_refreshes_updated_but_not_created() -> anyhow::Result<()> {
    let store = store()?;
    let mut consumer = full_consumer("moodle.example.org");
    store.save_consumer(&mut consumer)?;
    let created = consumer.created;
    let first_updated = consumer.updated;

    consumer.name = Some("Renamed".into());
    store.save_consumer(&mut consumer)?;
    assert_eq!(consumer.created, created);
    assert!(consumer.updated >= first_updated);

    let mut loaded = Consumer::by_record_id(consumer.record_id.unwrap());
    assert!(store.load_consumer(&mut loaded)?);
    assert_eq!(loaded.name.as_deref(), Some("Renamed"));
    assert_eq!(loaded.created, created);
    Ok(())
}

#[test]
fn list_consumers_orders_by_display_name() -> anyhow::Result<()> {
    let store = store()?;
    for (consumer_key, name) in [("c", "Charlie"), ("a", "Alpha"), ("b", "Bravo")] {
        let mut consumer = Consumer::new(consumer_key);
        consumer.name = Some(name.into());
        store.save_consumer(&mut consumer)?;
    }

    let names: Vec<_> = store
        .list_consumers()?
        .into_iter()
        .map(|c| c.name.unwrap())
        .collect();
    assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
    Ok(())
}

#[test]
fn file_backed_store_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("provost.db");

    {
        let store = Store::open(&path)?;
        store.init_schema()?;
        let mut consumer = full_consumer("durable");
        store.save_consumer(&mut consumer)?;
    }

    let reopened = Store::open(&path)?;
    reopened.init_schema()?;
    let mut loaded = Consumer::new("durable");
    assert!(reopened.load_consumer(&mut loaded)?);
    assert_eq!(loaded.name.as_deref(), Some("Moodle at Example"));
    Ok(())
}
