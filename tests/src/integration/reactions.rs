//! Reaction uniqueness and the per-tenant registered-reaction catalog.

#![cfg(test)]

use crate::test_engine;
use agora_engine::{EngineError, TenantId, Timestamp};

const TENANT: TenantId = TenantId(1);

#[test]
fn add_remove_add_cycle() {
    let mut engine = test_engine();
    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "react", None)
        .unwrap();

    engine.add_reaction(TENANT, post.id, "bob", "like").unwrap();
    assert!(matches!(
        engine.add_reaction(TENANT, post.id, "bob", "like"),
        Err(EngineError::AlreadyExists { .. })
    ));

    engine.remove_reaction(TENANT, post.id, "bob", "like").unwrap();
    assert!(matches!(
        engine.remove_reaction(TENANT, post.id, "bob", "like"),
        Err(EngineError::NotFound { .. })
    ));

    // After removal the same (user, value) can react again.
    engine.add_reaction(TENANT, post.id, "bob", "like").unwrap();
    assert_eq!(engine.list_reactions(TENANT, post.id).unwrap().len(), 1);
}

#[test]
fn registry_round_trip_and_tenant_scoping() {
    let mut engine = test_engine();

    engine
        .register_reaction(TENANT, "wave", "\u{1F44B}")
        .unwrap();
    engine
        .register_reaction(TENANT, "ship-it", "\u{1F6A2}")
        .unwrap();
    engine
        .register_reaction(TenantId(2), "wave", "different tenant")
        .unwrap();

    let listed = engine.list_registered_reactions(TENANT).unwrap();
    let shortcodes: Vec<&str> = listed.iter().map(|r| r.shortcode.as_str()).collect();
    // Prefix scan returns shortcode order.
    assert_eq!(shortcodes, vec!["ship-it", "wave"]);

    assert!(matches!(
        engine.register_reaction(TENANT, "wave", "again"),
        Err(EngineError::AlreadyExists { .. })
    ));
}

#[test]
fn reactions_survive_unrelated_poll_closures() {
    let mut engine = test_engine();
    let post = engine
        .create_post(Timestamp(1), TENANT, "alice", "busy post", None)
        .unwrap();
    let attachment = engine
        .add_attachment(
            Timestamp(1),
            TENANT,
            post.id,
            "alice",
            crate::poll(&["a", "b"], Timestamp(100)),
        )
        .unwrap();
    engine.add_reaction(TENANT, post.id, "bob", "like").unwrap();

    engine.tick(Timestamp(100)).unwrap();

    assert!(!engine.is_poll_active(TENANT, post.id, attachment.id).unwrap());
    assert_eq!(engine.list_reactions(TENANT, post.id).unwrap().len(), 1);
}
