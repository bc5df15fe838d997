use chrono::{Duration, Utc};
use provost_core::connector::DataConnector;
use provost_core::model::{Consumer, ConsumerNonce};
use provost_sqlite::Store;
use rusqlite::params;

fn store_with_consumer() -> anyhow::Result<(Store, i64)> {
    let store = Store::memory()?;
    store.init_schema()?;
    let mut consumer = Consumer::new("moodle.example.org");
    store.save_consumer(&mut consumer)?;
    Ok((store, consumer.record_id.unwrap()))
}

#[test]
fn first_use_is_unseen_and_second_is_a_replay() -> anyhow::Result<()> {
    let (store, consumer_id) = store_with_consumer()?;
    let nonce = ConsumerNonce::new(consumer_id, "launch-token-1", Utc::now() + Duration::hours(1));

    assert!(!store.load_nonce(&nonce)?, "a fresh token has not been seen");
    store.save_nonce(&nonce)?;
    assert!(store.load_nonce(&nonce)?, "the second sighting is a replay");
    Ok(())
}

#[test]
fn duplicate_record_surfaces_as_constraint_violation() -> anyhow::Result<()> {
    let (store, consumer_id) = store_with_consumer()?;
    let nonce = ConsumerNonce::new(consumer_id, "launch-token-1", Utc::now() + Duration::hours(1));

    store.save_nonce(&nonce)?;
    let err = store.save_nonce(&nonce).unwrap_err();
    assert!(err.is_constraint(), "a racing duplicate insert must be loud: {err}");
    Ok(())
}

#[test]
fn expired_token_is_purged_and_usable_again() -> anyhow::Result<()> {
    let (store, consumer_id) = store_with_consumer()?;
    let stale = ConsumerNonce::new(consumer_id, "launch-token-1", Utc::now() - Duration::hours(1));

    store.save_nonce(&stale)?;
    // the check itself sweeps expired rows first, so this is not a replay
    assert!(!store.load_nonce(&stale)?);
    // and the value can be recorded again under a fresh validity window
    let fresh = ConsumerNonce::new(consumer_id, "launch-token-1", Utc::now() + Duration::hours(1));
    store.save_nonce(&fresh)?;
    Ok(())
}

#[test]
fn the_lazy_purge_sweeps_all_consumers() -> anyhow::Result<()> {
    let (store, first_id) = store_with_consumer()?;
    let mut other = Consumer::new("sakai.example.edu");
    store.save_consumer(&mut other)?;
    let other_id = other.record_id.unwrap();

    store.save_nonce(&ConsumerNonce::new(
        first_id,
        "stale",
        Utc::now() - Duration::minutes(5),
    ))?;

    // checking an unrelated consumer's token still purges the stale row
    let unrelated = ConsumerNonce::new(other_id, "fresh", Utc::now() + Duration::hours(1));
    assert!(!store.load_nonce(&unrelated)?);

    let conn = store.conn.lock().unwrap();
    let remaining: i64 = conn.query_row(
        "SELECT COUNT(*) FROM lti_nonce WHERE consumer_pk = ?1",
        params![first_id],
        |r| r.get(0),
    )?;
    assert_eq!(remaining, 0);
    Ok(())
}

#[test]
fn explicit_sweep_reports_purged_rows() -> anyhow::Result<()> {
    let (store, consumer_id) = store_with_consumer()?;
    for (value, offset) in [("a", -10), ("b", -5), ("c", 60)] {
        store.save_nonce(&ConsumerNonce::new(
            consumer_id,
            value,
            Utc::now() + Duration::minutes(offset),
        ))?;
    }
    assert_eq!(store.purge_nonces()?, 2);
    assert_eq!(store.purge_nonces()?, 0, "the sweep is idempotent");
    Ok(())
}
