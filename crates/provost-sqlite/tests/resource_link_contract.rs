use provost_core::connector::DataConnector;
use provost_core::model::{
    Consumer, Context, ResourceLink, ResourceLinkOwner, ShareApproval,
};
use provost_sqlite::Store;
use rusqlite::params;

struct Fixture {
    store: Store,
    consumer_id: i64,
    context_id: i64,
}

fn fixture() -> anyhow::Result<Fixture> {
    let store = Store::memory()?;
    store.init_schema()?;
    let mut consumer = Consumer::new("moodle.example.org");
    store.save_consumer(&mut consumer)?;
    let consumer_id = consumer.record_id.unwrap();
    let mut context = Context::new(consumer_id, "course-101");
    store.save_context(&mut context)?;
    Ok(Fixture {
        store,
        consumer_id,
        context_id: context.record_id.unwrap(),
    })
}

#[test]
fn load_resolves_by_context_then_platform_id() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut saved = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut saved)?;

    let mut loaded = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    assert!(f.store.load_resource_link(&mut loaded)?);
    assert_eq!(loaded.record_id, saved.record_id);
    assert_eq!(loaded.owner, Some(ResourceLinkOwner::Context(f.context_id)));
    Ok(())
}

#[test]
fn consumer_scoped_load_searches_both_ownership_paths() -> anyhow::Result<()> {
    let f = fixture()?;
    // owned via the context, not directly by the consumer
    let mut saved = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut saved)?;

    // a context-less launch only knows the consumer; the search must
    // still find the context-owned row
    let mut loaded = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "quiz-1");
    assert!(f.store.load_resource_link(&mut loaded)?);
    assert_eq!(loaded.record_id, saved.record_id);
    assert_eq!(
        loaded.owner,
        Some(ResourceLinkOwner::Context(f.context_id)),
        "the row's true owner wins over the lookup hint"
    );

    // and a directly-owned row is found the same way
    let mut direct = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "page-1");
    f.store.save_resource_link(&mut direct)?;
    let mut loaded_direct = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "page-1");
    assert!(f.store.load_resource_link(&mut loaded_direct)?);
    assert_eq!(loaded_direct.owner, Some(ResourceLinkOwner::Consumer(f.consumer_id)));
    Ok(())
}

#[test]
fn record_id_takes_precedence_over_owner_lookup() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut saved = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut saved)?;

    let mut loaded = ResourceLink::by_record_id(saved.record_id.unwrap());
    assert!(f.store.load_resource_link(&mut loaded)?);
    assert_eq!(loaded.lti_resource_link_id, "quiz-1");
    Ok(())
}

#[test]
fn update_cannot_silently_reassign_ownership() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut link = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut link)?;
    let link_id = link.record_id.unwrap();

    // claim the row belongs directly to the consumer: the WHERE clause
    // matches nothing, and that surfaces instead of succeeding silently
    let mut reassigned = link.clone();
    reassigned.owner = Some(ResourceLinkOwner::Consumer(f.consumer_id));
    let err = f.store.save_resource_link(&mut reassigned).unwrap_err();
    assert!(err.is_constraint(), "{err}");

    let conn = f.store.conn.lock().unwrap();
    let (context_pk, consumer_pk): (Option<i64>, Option<i64>) = conn.query_row(
        "SELECT context_pk, consumer_pk FROM lti_resource_link WHERE resource_link_pk = ?1",
        params![link_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    assert_eq!(context_pk, Some(f.context_id));
    assert_eq!(consumer_pk, None);
    Ok(())
}

#[test]
fn sharing_reference_roundtrip_with_tri_state_approval() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut primary = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut primary)?;
    let mut secondary = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "quiz-1-mirror");
    f.store.save_resource_link(&mut secondary)?;

    {
        // no primary reference yet: the approval column stays NULL
        let conn = f.store.conn.lock().unwrap();
        let approved: Option<i64> = conn.query_row(
            "SELECT share_approved FROM lti_resource_link WHERE resource_link_pk = ?1",
            params![secondary.record_id.unwrap()],
            |r| r.get(0),
        )?;
        assert_eq!(approved, None);
    }

    secondary.primary_resource_link_id = primary.record_id;
    secondary.share_approved = ShareApproval::Rejected;
    f.store.save_resource_link(&mut secondary)?;

    let mut reloaded = ResourceLink::by_record_id(secondary.record_id.unwrap());
    assert!(f.store.load_resource_link(&mut reloaded)?);
    assert_eq!(reloaded.primary_resource_link_id, primary.record_id);
    assert_eq!(reloaded.share_approved, ShareApproval::Rejected);

    reloaded.share_approved = ShareApproval::Approved;
    f.store.save_resource_link(&mut reloaded)?;
    let mut again = ResourceLink::by_record_id(reloaded.record_id.unwrap());
    assert!(f.store.load_resource_link(&mut again)?);
    assert_eq!(again.share_approved, ShareApproval::Approved);
    Ok(())
}

#[test]
fn sharing_never_chains_through_a_secondary() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut primary = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut primary)?;
    let mut secondary = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "mirror");
    secondary.primary_resource_link_id = primary.record_id;
    f.store.save_resource_link(&mut secondary)?;

    let mut chained = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "mirror-of-mirror");
    chained.primary_resource_link_id = secondary.record_id;
    let err = f.store.save_resource_link(&mut chained).unwrap_err();
    assert!(err.is_constraint(), "{err}");
    Ok(())
}

#[test]
fn a_primary_reference_must_exist() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut orphan = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "mirror");
    orphan.primary_resource_link_id = Some(40_404);
    let err = f.store.save_resource_link(&mut orphan).unwrap_err();
    assert!(err.is_constraint(), "{err}");
    Ok(())
}

#[test]
fn shares_lists_secondaries_with_their_approval() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut primary = ResourceLink::new(ResourceLinkOwner::Context(f.context_id), "quiz-1");
    f.store.save_resource_link(&mut primary)?;

    let mut other = Consumer::new("sakai.example.edu");
    f.store.save_consumer(&mut other)?;
    let other_id = other.record_id.unwrap();

    let mut approved = ResourceLink::new(ResourceLinkOwner::Consumer(other_id), "mirror-a");
    approved.primary_resource_link_id = primary.record_id;
    approved.share_approved = ShareApproval::Approved;
    f.store.save_resource_link(&mut approved)?;

    let mut pending = ResourceLink::new(ResourceLinkOwner::Consumer(f.consumer_id), "mirror-b");
    pending.primary_resource_link_id = primary.record_id;
    f.store.save_resource_link(&mut pending)?;

    let shares = f.store.shares(&primary)?;
    assert_eq!(shares.len(), 2);
    // ordered by owning consumer
    assert_eq!(shares[0].consumer_id, Some(f.consumer_id));
    assert_eq!(shares[0].approved, ShareApproval::Unset);
    assert_eq!(shares[1].consumer_id, Some(other_id));
    assert_eq!(shares[1].approved, ShareApproval::Approved);
    Ok(())
}
