//! Tick ordering, idempotence, and replay determinism.

#![cfg(test)]

use crate::{poll, test_engine};
use agora_engine::{EventKind, TenantId, Timestamp};
use agora_store::ContentStore;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const TENANT: TenantId = TenantId(1);

#[test]
fn polls_close_in_nondecreasing_end_time_order() {
    crate::init_tracing();
    let mut engine = test_engine();
    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "many polls", None)
        .unwrap();

    // Insert polls with shuffled end times; closure order must follow the
    // end times, not the insertion order.
    let mut end_times: Vec<u64> = (1..=20).map(|i| 100 * i).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    end_times.shuffle(&mut rng);

    let mut by_end_time = Vec::new();
    for &end in &end_times {
        let attachment = engine
            .add_attachment(
                Timestamp(1),
                TENANT,
                post.id,
                "alice",
                poll(&["a", "b"], Timestamp(end)),
            )
            .unwrap();
        by_end_time.push((end, attachment.id));
    }
    by_end_time.sort();

    assert_eq!(engine.tick(Timestamp(10_000)).unwrap(), 20);

    let closed = engine.events().of_kind(EventKind::PollClosed);
    let closed_polls: Vec<String> = closed
        .iter()
        .map(|e| {
            e.attributes
                .iter()
                .find(|(k, _)| k == "poll_id")
                .unwrap()
                .1
                .clone()
        })
        .collect();
    let expected: Vec<String> = by_end_time
        .iter()
        .map(|(_, id)| id.0.to_string())
        .collect();
    assert_eq!(closed_polls, expected);
}

#[test]
fn ties_break_by_tenant_then_post_then_poll() {
    let mut engine = test_engine();
    let deadline = Timestamp(100);

    // Same end time across two tenants and two posts each.
    let mut expected = Vec::new();
    for tenant in [TenantId(1), TenantId(2)] {
        for _ in 0..2 {
            let post = engine
                .create_post(Timestamp(1), tenant, "alice", "tied", None)
                .unwrap();
            let attachment = engine
                .add_attachment(Timestamp(1), tenant, post.id, "alice", poll(&["a", "b"], deadline))
                .unwrap();
            expected.push((tenant.0, post.id.0, attachment.id.0));
        }
    }

    assert_eq!(engine.tick(deadline).unwrap(), 4);

    let closed: Vec<(u64, u64, u32)> = engine
        .events()
        .of_kind(EventKind::PollClosed)
        .iter()
        .map(|e| {
            let get = |name: &str| {
                e.attributes
                    .iter()
                    .find(|(k, _)| k == name)
                    .unwrap()
                    .1
                    .clone()
            };
            (
                get("tenant").parse().unwrap(),
                get("post_id").parse().unwrap(),
                get("poll_id").parse().unwrap(),
            )
        })
        .collect();
    assert_eq!(closed, expected);
}

#[test]
fn repeated_ticks_do_not_retally() {
    let mut engine = test_engine();
    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "vote", None)
        .unwrap();
    let attachment = engine
        .add_attachment(Timestamp(1), TENANT, post.id, "alice", poll(&["a", "b"], Timestamp(100)))
        .unwrap();
    engine
        .answer_poll(Timestamp(10), TENANT, post.id, attachment.id, "bob", &[0])
        .unwrap();

    assert_eq!(engine.tick(Timestamp(100)).unwrap(), 1);
    let first = engine.get_poll(TENANT, post.id, attachment.id).unwrap();

    assert_eq!(engine.tick(Timestamp(100)).unwrap(), 0);
    assert_eq!(engine.tick(Timestamp(9_999)).unwrap(), 0);
    let after = engine.get_poll(TENANT, post.id, attachment.id).unwrap();
    assert_eq!(first, after);
    assert_eq!(engine.events().of_kind(EventKind::PollClosed).len(), 1);
}

#[test]
fn identical_command_sequences_produce_identical_stores() {
    let run = |seed: u64| {
        let mut engine = test_engine();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

        let mut polls = Vec::new();
        for i in 0..5 {
            let post = engine
                .create_post(Timestamp(i + 1), TENANT, "alice", &format!("post {i}"), None)
                .unwrap();
            let mut ends: Vec<u64> = (1..=3).map(|j| 100 * j + i).collect();
            ends.shuffle(&mut rng);
            for end in ends {
                let a = engine
                    .add_attachment(
                        Timestamp(i + 1),
                        TENANT,
                        post.id,
                        "alice",
                        poll(&["x", "y", "z"], Timestamp(end)),
                    )
                    .unwrap();
                polls.push((post.id, a.id, end));
            }
        }
        for (n, &(post_id, poll_id, end)) in polls.iter().enumerate() {
            if end > 50 {
                engine
                    .answer_poll(
                        Timestamp(50),
                        TENANT,
                        post_id,
                        poll_id,
                        &format!("user-{}", n % 3),
                        &[(n % 3) as u32],
                    )
                    .unwrap();
            }
        }
        engine.tick(Timestamp(150)).unwrap();
        engine.tick(Timestamp(400)).unwrap();

        let (store, _) = engine.into_parts();
        store.prefix_scan(&[]).unwrap()
    };

    // Same seed, same everything: the resulting stores are bit-identical.
    assert_eq!(run(42), run(42));
}
