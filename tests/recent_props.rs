//! Property tests for the MRU recent-list invariants: bounded length, no
//! duplicates, trimmed-only content, and MRU eviction order under arbitrary
//! save/remove sequences.

use std::sync::Arc;

use proptest::prelude::*;
use querybar::{MemoryStorage, RecentSearchStore};

fn fresh_store(max_recent: usize) -> RecentSearchStore {
    RecentSearchStore::new(Arc::new(MemoryStorage::new()), Some("props".into()))
        .with_max_recent(max_recent)
}

/// Queries with leading/trailing whitespace and occasional all-whitespace
/// entries, to exercise the trim/no-op path.
fn query_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}",
        " {0,3}[a-z]{1,8} {0,3}",
        " {1,4}",
        "[a-z]{1,4} [a-z]{1,4}",
    ]
}

proptest! {
    #[test]
    fn save_sequences_keep_invariants(
        queries in prop::collection::vec(query_strategy(), 0..40),
        max_recent in 1usize..8,
    ) {
        let store = fresh_store(max_recent);
        for q in &queries {
            let list = store.save(q);
            prop_assert!(list.len() <= max_recent);
            // No duplicates.
            let mut sorted = list.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), list.len());
            // Everything stored is trimmed and non-empty.
            for entry in &list {
                prop_assert!(!entry.is_empty());
                prop_assert_eq!(entry.as_str(), entry.trim());
            }
        }
        // Reload agrees with the last returned state.
        let final_list = store.load();
        prop_assert!(final_list.len() <= max_recent);
    }

    #[test]
    fn most_recent_distinct_saves_survive_in_order(
        queries in prop::collection::vec("[a-z]{1,6}", 1..30),
        max_recent in 1usize..6,
    ) {
        let store = fresh_store(max_recent);
        for q in &queries {
            store.save(q);
        }
        // Expected: last-occurrence order, newest first, capped.
        let mut expected: Vec<String> = Vec::new();
        for q in queries.iter().rev() {
            if !expected.contains(q) {
                expected.push(q.clone());
            }
        }
        expected.truncate(max_recent);
        prop_assert_eq!(store.load(), expected);
    }

    #[test]
    fn saved_query_round_trips_trimmed_to_front(q in " {0,2}[a-z]{1,8} {0,2}") {
        let store = fresh_store(5);
        store.save("earlier");
        let list = store.save(&q);
        prop_assert_eq!(list.first().map(String::as_str), Some(q.trim()));
        let loaded = store.load();
        prop_assert_eq!(loaded.first().map(String::as_str), Some(q.trim()));
    }

    #[test]
    fn double_save_is_single_occurrence_at_front(
        prefix in prop::collection::vec("[a-z]{1,6}", 0..5),
        q in "[a-z]{1,6}",
    ) {
        let store = fresh_store(5);
        for p in &prefix {
            store.save(p);
        }
        store.save(&q);
        let list = store.save(&q);
        prop_assert_eq!(list.iter().filter(|s| *s == &q).count(), 1);
        prop_assert_eq!(list.first(), Some(&q));
    }

    #[test]
    fn remove_deletes_without_reordering_the_rest(
        queries in prop::collection::vec("[a-z]{1,6}", 1..15),
        pick in any::<prop::sample::Index>(),
    ) {
        let store = fresh_store(10);
        for q in &queries {
            store.save(q);
        }
        let before = store.load();
        let victim = pick.get(&before).clone();
        let after = store.remove(&victim);
        let expected: Vec<String> =
            before.iter().filter(|s| **s != victim).cloned().collect();
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn clear_always_yields_empty(queries in prop::collection::vec("[a-z]{1,6}", 0..15)) {
        let store = fresh_store(5);
        for q in &queries {
            store.save(q);
        }
        prop_assert!(store.clear().is_empty());
        prop_assert!(store.load().is_empty());
    }
}
