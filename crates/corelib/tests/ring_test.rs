//! End-to-end tests for the hash ring over slab storage.
//!
//! # Test Strategy
//!
//! 1. **Successor lookup**: hand-constructed ring with known positions
//! 2. **Lifecycle**: load/remove round trips, idempotent removal
//! 3. **Expansion**: threshold trigger, membership preservation
//! 4. **Virtual nodes**: weighted loads
//! 5. **Properties**: proptest over arbitrary item sets

use corelib::{Error, HashRing, RingBuilder, RingHash};
use proptest::prelude::*;
use std::collections::HashSet;

/// Places numeric items at their own value, so ring positions are chosen
/// by hand in tests.
struct IdentityHash;

impl RingHash<u64> for IdentityHash {
    fn hash_item(&self, item: &u64) -> u32 {
        *item as u32
    }

    fn name(&self) -> &'static str {
        "IdentityHash"
    }
}

fn hand_built_ring() -> HashRing<u64, IdentityHash> {
    // capacity 8, items at indices 2 and 5, no collisions
    let mut ring = RingBuilder::new()
        .with_capacity(8)
        .with_probe_seed(1)
        .with_hasher(IdentityHash)
        .build();
    ring.load(2).unwrap();
    ring.load(5).unwrap();
    ring
}

// ============================================================================
// Successor Lookup
// ============================================================================

#[test]
fn test_successor_correctness() {
    let ring = hand_built_ring();
    assert_eq!(ring.capacity(), 8);

    // each query point is owned by its nearest occupied successor
    assert_eq!(*ring.access(0).unwrap(), 2);
    assert_eq!(*ring.access(1).unwrap(), 2);
    assert_eq!(*ring.access(2).unwrap(), 2);
    assert_eq!(*ring.access(3).unwrap(), 5);
    assert_eq!(*ring.access(5).unwrap(), 5);
    // wraps past the end back to the item at index 2
    assert_eq!(*ring.access(6).unwrap(), 2);
    assert_eq!(*ring.access(7).unwrap(), 2);
}

#[test]
fn test_ring_coverage() {
    let ring = hand_built_ring();
    for index in 0..ring.capacity() {
        let owner = ring.access(index).unwrap();
        assert!([2, 5].contains(owner), "index {index} owned by {owner}");
    }
}

#[test]
fn test_access_out_of_range() {
    let ring = hand_built_ring();
    match ring.access(8) {
        Err(Error::OutOfRange { index, capacity }) => {
            assert_eq!(index, 8);
            assert_eq!(capacity, 8);
        }
        other => panic!("expected out-of-range error, got {other:?}"),
    }
}

#[test]
fn test_access_empty_ring() {
    let ring: HashRing<u64> = HashRing::new();
    assert!(matches!(ring.access(0), Err(Error::EmptyRing)));
}

#[test]
fn test_consistent_access() {
    // the same query point resolves to the same item across reads
    let mut ring: HashRing<String> = RingBuilder::new().with_probe_seed(4).build();
    for name in ["alpha", "beta", "gamma"] {
        ring.load(name.to_owned()).unwrap();
    }
    let first = ring.access(11).unwrap().clone();
    for _ in 0..10 {
        assert_eq!(*ring.access(11).unwrap(), first);
    }
}

// ============================================================================
// Load / Remove Lifecycle
// ============================================================================

#[test]
fn test_load_remove_round_trip() {
    let mut ring: HashRing<String> = RingBuilder::new().with_probe_seed(2).build();
    let items: Vec<String> = (0..20).map(|i| format!("item-{i}")).collect();

    for item in &items {
        ring.load(item.clone()).unwrap();
    }
    assert_eq!(ring.len(), 20);
    assert_eq!(ring.entry_count(), 20);

    for item in &items {
        assert!(ring.remove(item, |a, b| a == b), "failed to remove {item}");
    }
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.entry_count(), 0);
    assert!(ring.is_empty());
    assert!(matches!(ring.access(0), Err(Error::EmptyRing)));
}

#[test]
fn test_remove_not_found_is_a_negative_result() {
    let mut ring: HashRing<u64> = HashRing::new();
    ring.load(1).unwrap();
    ring.load(2).unwrap();

    assert!(!ring.remove(&99, |a, b| a == b));
    // nothing changed
    assert_eq!(ring.len(), 2);
    assert_eq!(ring.entry_count(), 2);
    assert!(ring.contains(&1, |a, b| a == b));
    assert!(ring.contains(&2, |a, b| a == b));
}

#[test]
fn test_remove_matches_by_value_not_identity() {
    let mut ring: HashRing<String> = HashRing::new();
    ring.load("stored".to_owned()).unwrap();
    // a fresh allocation with equal content still matches
    let probe = String::from("stored");
    assert!(ring.remove(&probe, |a, b| a == b));
    assert!(ring.is_empty());
}

#[test]
fn test_iteration_is_insertion_ordered() {
    let mut ring: HashRing<u64> = HashRing::new();
    for item in [30, 10, 20] {
        ring.load(item).unwrap();
    }
    ring.remove(&10, |a, b| a == b);
    ring.load(40).unwrap();
    let order: Vec<u64> = ring.iter().copied().collect();
    assert_eq!(order, vec![30, 20, 40]);
}

// ============================================================================
// Expansion
// ============================================================================

#[test]
fn test_expansion_trigger_scenario() {
    // initial capacity 32, threshold 32/3 = 10: the 11th load expands to 64
    let mut ring: HashRing<u64> = RingBuilder::new()
        .with_capacity(32)
        .with_probe_seed(6)
        .build();

    for item in 0..10 {
        ring.load(item).unwrap();
        assert_eq!(ring.capacity(), 32, "no expansion through load {item}");
    }
    ring.load(10).unwrap();
    assert_eq!(ring.capacity(), 64, "11th load doubles the ring");
    assert_eq!(ring.len(), 11);
    assert_eq!(ring.entry_count(), 11);
}

#[test]
fn test_expansion_preserves_membership() {
    let mut ring: HashRing<u64> = RingBuilder::new()
        .with_capacity(32)
        .with_probe_seed(6)
        .build();
    for item in 0..10 {
        ring.load(item).unwrap();
    }
    let before: HashSet<u64> = ring.iter().copied().collect();

    ring.load(10).unwrap(); // triggers the expand
    let mut expected = before;
    expected.insert(10);
    let after: HashSet<u64> = ring.iter().copied().collect();
    assert_eq!(after, expected);

    // everything is still reachable through successor lookups
    let mut owners = HashSet::new();
    for index in 0..ring.capacity() {
        owners.insert(*ring.access(index).unwrap());
    }
    assert_eq!(owners, after);
}

#[test]
fn test_repeated_expansion_under_sustained_load() {
    let mut ring: HashRing<u64> = RingBuilder::new()
        .with_capacity(32)
        .with_probe_seed(8)
        .build();
    for item in 0..500 {
        ring.load(item).unwrap();
    }
    assert_eq!(ring.len(), 500);
    assert!(ring.capacity().is_power_of_two());
    // the load-factor bound held at every step
    assert!(ring.entry_count() <= ring.capacity() / 3);
}

// ============================================================================
// Virtual Nodes
// ============================================================================

#[test]
fn test_weighted_load_places_multiple_entries() {
    let mut ring: HashRing<String> = RingBuilder::new()
        .with_capacity(64)
        .with_probe_seed(5)
        .build();
    ring.load_weighted("heavy".to_owned(), 8).unwrap();
    ring.load("light".to_owned()).unwrap();

    assert_eq!(ring.len(), 2);
    assert_eq!(ring.entry_count(), 9);

    // removal clears every position the element held
    assert!(ring.remove(&"heavy".to_owned(), |a, b| a == b));
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.entry_count(), 1);
}

#[test]
fn test_weighted_load_survives_expansion() {
    let mut ring: HashRing<String> = RingBuilder::new()
        .with_capacity(32)
        .with_probe_seed(5)
        .build();
    ring.load_weighted("heavy".to_owned(), 4).unwrap();
    for i in 0..40 {
        ring.load(format!("filler-{i}")).unwrap();
    }
    // weight multiplicity is preserved across rehashes
    assert_eq!(ring.entry_count(), 4 + 40);
    assert!(ring.remove(&"heavy".to_owned(), |a, b| a == b));
    assert_eq!(ring.entry_count(), 40);
}

#[test]
fn test_zero_weight_stores_nothing() {
    let mut ring: HashRing<u64> = HashRing::new();
    ring.load_weighted(7, 0).unwrap();
    assert!(ring.is_empty());
    assert_eq!(ring.entry_count(), 0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_load_remove_round_trip(items in proptest::collection::hash_set(any::<u32>(), 1..64)) {
        let mut ring: HashRing<u32> = RingBuilder::new().with_probe_seed(42).build();
        for &item in &items {
            ring.load(item).unwrap();
        }
        prop_assert_eq!(ring.len(), items.len());
        for &item in &items {
            prop_assert!(ring.remove(&item, |a, b| a == b));
        }
        prop_assert_eq!(ring.len(), 0);
        prop_assert_eq!(ring.entry_count(), 0);
    }

    #[test]
    fn prop_expansion_preserves_membership(items in proptest::collection::hash_set(any::<u32>(), 1..256)) {
        let mut ring: HashRing<u32> = RingBuilder::new()
            .with_capacity(32)
            .with_probe_seed(7)
            .build();
        for &item in &items {
            ring.load(item).unwrap();
        }
        let stored: HashSet<u32> = ring.iter().copied().collect();
        prop_assert_eq!(stored, items);
        prop_assert!(ring.capacity().is_power_of_two());
        prop_assert!(ring.entry_count() <= ring.capacity() / 3);
    }

    #[test]
    fn prop_coverage_with_any_occupancy(items in proptest::collection::hash_set(any::<u32>(), 1..32)) {
        let mut ring: HashRing<u32> = RingBuilder::new().with_probe_seed(11).build();
        for &item in &items {
            ring.load(item).unwrap();
        }
        for index in 0..ring.capacity() {
            let owner = ring.access(index).unwrap();
            prop_assert!(items.contains(owner));
        }
    }
}
