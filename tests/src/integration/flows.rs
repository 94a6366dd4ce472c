//! End-to-end poll scenarios: create a post, attach a poll, answer it, and
//! drive the lifecycle tick across the deadline.

#![cfg(test)]

use crate::{poll, test_engine};
use agora_engine::{
    AttachmentContent, EngineError, EventKind, TenantId, Timestamp,
};

const TENANT: TenantId = TenantId(1);

#[test]
fn multi_answer_poll_closes_with_expected_tally() {
    let mut engine = test_engine();
    let deadline = Timestamp(1_000);

    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "cats or dogs? #pets", None)
        .unwrap();
    let attachment = engine
        .add_attachment(
            Timestamp(1),
            TENANT,
            post.id,
            "alice",
            poll(&["Cat", "Dog", "Other"], deadline),
        )
        .unwrap();

    engine
        .answer_poll(Timestamp(10), TENANT, post.id, attachment.id, "user-a", &[0, 1])
        .unwrap();
    engine
        .answer_poll(Timestamp(20), TENANT, post.id, attachment.id, "user-b", &[1])
        .unwrap();

    assert_eq!(engine.tick(deadline).unwrap(), 1);

    let closed = engine.get_poll(TENANT, post.id, attachment.id).unwrap();
    assert!(!closed.is_open);
    let tally = closed.final_tally.expect("tally must be recorded");
    let counts: Vec<(u32, u64)> = tally
        .results
        .iter()
        .map(|r| (r.answer_index, r.votes))
        .collect();
    assert_eq!(counts, vec![(0, 1), (1, 2), (2, 0)]);

    // Conservation: total votes == sum of per-user selections (2 + 1).
    assert_eq!(tally.total_votes(), 3);

    // Queue entry removed, answers purged.
    assert!(!engine.is_poll_active(TENANT, post.id, attachment.id).unwrap());
    assert!(engine
        .get_poll_answers(TENANT, post.id, attachment.id)
        .unwrap()
        .is_empty());
}

#[test]
fn tick_one_nanosecond_early_leaves_the_poll_open() {
    let mut engine = test_engine();
    let deadline = Timestamp(1_000);

    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "cats or dogs?", None)
        .unwrap();
    let attachment = engine
        .add_attachment(
            Timestamp(1),
            TENANT,
            post.id,
            "alice",
            poll(&["Cat", "Dog", "Other"], deadline),
        )
        .unwrap();
    engine
        .answer_poll(Timestamp(10), TENANT, post.id, attachment.id, "user-a", &[0])
        .unwrap();

    assert_eq!(engine.tick(deadline.minus_nanos(1)).unwrap(), 0);

    let open = engine.get_poll(TENANT, post.id, attachment.id).unwrap();
    assert!(open.is_open);
    assert!(open.final_tally.is_none());
    assert!(engine.is_poll_active(TENANT, post.id, attachment.id).unwrap());
    assert_eq!(
        engine
            .get_poll_answers(TENANT, post.id, attachment.id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn answer_edit_denied_when_poll_forbids_it() {
    let mut engine = test_engine();
    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "one shot", None)
        .unwrap();
    // `poll` builds with allows_answer_edits = false.
    let attachment = engine
        .add_attachment(
            Timestamp(1),
            TENANT,
            post.id,
            "alice",
            poll(&["Cat", "Dog"], Timestamp(1_000)),
        )
        .unwrap();

    engine
        .answer_poll(Timestamp(10), TENANT, post.id, attachment.id, "user-a", &[0])
        .unwrap();
    let second = engine.answer_poll(Timestamp(20), TENANT, post.id, attachment.id, "user-a", &[1]);
    assert!(matches!(second, Err(EngineError::FailedPrecondition { .. })));

    let stored = engine
        .get_poll_answers(TENANT, post.id, attachment.id)
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].answer_indexes, vec![0]);
}

#[test]
fn full_flow_keeps_invariants_clean_and_emits_events() {
    let mut engine = test_engine();

    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "media and a poll #mix", None)
        .unwrap();
    engine
        .add_attachment(
            Timestamp(1),
            TENANT,
            post.id,
            "alice",
            AttachmentContent::Media {
                uri: "https://example.com/banner.png".to_owned(),
                mime_type: "image/png".to_owned(),
            },
        )
        .unwrap();
    let attachment = engine
        .add_attachment(
            Timestamp(2),
            TENANT,
            post.id,
            "alice",
            poll(&["yes", "no"], Timestamp(500)),
        )
        .unwrap();
    engine
        .answer_poll(Timestamp(5), TENANT, post.id, attachment.id, "bob", &[1])
        .unwrap();
    engine.add_reaction(TENANT, post.id, "bob", "like").unwrap();
    engine
        .create_post(Timestamp(6), TENANT, "bob", "nice one", Some(post.id))
        .unwrap();
    engine.tick(Timestamp(500)).unwrap();

    let reports = engine.run_invariants().unwrap();
    assert!(reports.iter().all(|r| !r.violated), "{reports:?}");

    let sink = engine.events();
    assert_eq!(sink.of_kind(EventKind::PostCreated).len(), 2);
    assert_eq!(sink.of_kind(EventKind::AttachmentAdded).len(), 2);
    assert_eq!(sink.of_kind(EventKind::PollAnswered).len(), 1);
    assert_eq!(sink.of_kind(EventKind::ReactionAdded).len(), 1);
    assert_eq!(sink.of_kind(EventKind::PollClosed).len(), 1);
}
