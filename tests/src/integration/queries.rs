//! Listing, filtering, and pagination against a populated store.

#![cfg(test)]

use crate::test_engine;
use agora_engine::{PageRequest, PostFilter, TenantId, Timestamp};

const TENANT: TenantId = TenantId(1);
const OTHER_TENANT: TenantId = TenantId(2);

#[test]
fn tenants_are_fully_isolated() {
    let mut engine = test_engine();
    engine
        .create_post(Timestamp(1), TENANT, "alice", "tenant one", None)
        .unwrap();
    engine
        .create_post(Timestamp(1), OTHER_TENANT, "alice", "tenant two", None)
        .unwrap();

    let one = engine
        .list_posts(TENANT, &PostFilter::default(), PageRequest::new(0, 10))
        .unwrap();
    let two = engine
        .list_posts(OTHER_TENANT, &PostFilter::default(), PageRequest::new(0, 10))
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(two.len(), 1);
    assert_eq!(one[0].text, "tenant one");
    assert_eq!(two[0].text, "tenant two");
}

#[test]
fn pagination_partitions_the_filtered_result_exactly() {
    let mut engine = test_engine();
    for i in 0..23u64 {
        let author = if i % 2 == 0 { "alice" } else { "bob" };
        engine
            .create_post(
                Timestamp(1_000 - i), // reverse chronological insertion
                TENANT,
                author,
                &format!("post {i} #feed"),
                None,
            )
            .unwrap();
    }

    let filter = PostFilter {
        author: Some("alice".to_owned()),
        hashtags: vec!["feed".to_owned()],
        ..Default::default()
    };
    let full = engine
        .list_posts(TENANT, &filter, PageRequest::new(0, 1_000))
        .unwrap();
    assert_eq!(full.len(), 12);

    // Sorted ascending by creation time regardless of insertion order.
    assert!(full.windows(2).all(|w| w[0].created_at <= w[1].created_at));

    for limit in [1usize, 5, 12, 30] {
        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let page = engine
                .list_posts(TENANT, &filter, PageRequest::new(offset, limit))
                .unwrap();
            assert!(page.len() <= limit);
            if page.is_empty() {
                break;
            }
            paged.extend(page);
            offset += limit;
        }
        assert_eq!(paged, full, "limit {limit} must partition exactly");
    }
}

#[test]
fn descending_listing_is_the_exact_reverse() {
    let mut engine = test_engine();
    for i in 0..9u64 {
        engine
            .create_post(Timestamp(i + 1), TENANT, "alice", &format!("p{i}"), None)
            .unwrap();
    }

    let asc = engine
        .list_posts(TENANT, &PostFilter::default(), PageRequest::new(0, 100))
        .unwrap();
    let mut desc = engine
        .list_posts(
            TENANT,
            &PostFilter::default(),
            PageRequest::new(0, 100).descending(),
        )
        .unwrap();
    desc.reverse();
    assert_eq!(asc, desc);
}
