//! Backpressure and Structural Hazard Tests.
//!
//! Verifies that the MSHR table gates acceptance at its configured capacity, that
//! a rejection changes nothing, and that rejected requests are accepted once the
//! blocking condition clears. Also covers the blocking variant and the two
//! structural hazards that reject a miss while MSHRs are still free.

use csim_core::CacheController;
use csim_core::cache::policies::RandomPolicy;
use csim_core::cache::storage::LineState;
use csim_core::config::CacheKind;
use pretty_assertions::assert_eq;

use crate::common::harness::{CacheHarness, SMALL, pattern};
use crate::common::mocks::MockPolicy;

// ══════════════════════════════════════════════════════════
// 1. Capacity
// ══════════════════════════════════════════════════════════

/// Every configured MSHR can hold a miss; the cache blocks only when all are used.
#[rstest::rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn blocks_exactly_at_capacity(#[case] mshrs: usize) {
    let mut h = CacheHarness::small(mshrs);

    // Distinct blocks, alternating sets, two ways each: never a structural hazard.
    let blocks = [0x00, 0x08, 0x10, 0x18];
    for (id, &addr) in blocks.iter().take(mshrs).enumerate() {
        assert!(!h.cache.is_blocked());
        assert!(h.load(id as u64, addr, 1), "miss {id} refused below capacity");
    }
    assert!(h.cache.is_blocked());
    assert_eq!(h.cache.mshrs().occupancy(), mshrs);
}

#[test]
fn blocked_cache_rejects_without_side_effects() {
    let mut h = CacheHarness::small(2);
    assert!(h.load(1, 0x00, 1));
    assert!(h.load(2, 0x08, 1));
    assert!(h.cache.is_blocked());

    let traffic = h.memory.requests.clone();
    assert!(!h.load(3, 0x10, 1));
    assert!(!h.store(4, 0x18, &[1]));

    assert_eq!(h.memory.requests, traffic);
    assert!(h.processor.completions.is_empty());
    assert_eq!(h.cache.mshrs().occupancy(), 2);
}

/// While blocked even a hit is refused.
#[test]
fn blocked_cache_rejects_hits() {
    let mut h = CacheHarness::small(2);
    h.warm(1, 0x18);
    assert!(h.load(2, 0x00, 1));
    assert!(h.load(3, 0x10, 1));
    assert!(h.cache.is_blocked());

    assert!(!h.load(4, 0x18, 1));
    assert_eq!(h.processor.ids(), vec![1]);
}

/// A rejected request, retried identically after a completion, is accepted.
#[test]
fn retry_after_completion_is_accepted() {
    let mut h = CacheHarness::small(2);
    assert!(h.load(1, 0x00, 1));
    assert!(h.load(2, 0x08, 1));
    assert!(!h.load(3, 0x10, 1));

    h.fill(2);
    assert!(!h.cache.is_blocked());
    assert!(h.load(3, 0x10, 1));
    assert!(h.cache.is_blocked());

    h.fill(1);
    h.fill(3);
    assert_eq!(h.processor.ids(), vec![2, 1, 3]);
    assert_eq!(h.loaded(3), vec![pattern(0x10, 1)[0]]);
}

/// The blocked flag follows occupancy after every completion, not just the first.
#[test]
fn blocked_flag_tracks_occupancy() {
    let mut h = CacheHarness::small(3);
    assert!(h.load(1, 0x00, 1));
    assert!(h.load(2, 0x08, 1));
    assert!(!h.cache.is_blocked());
    assert!(h.load(3, 0x10, 1));
    assert!(h.cache.is_blocked());

    h.fill(3);
    assert!(!h.cache.is_blocked());
    assert!(h.load(4, 0x18, 1));
    assert!(h.cache.is_blocked());

    h.fill(1);
    h.fill(2);
    h.fill(4);
    assert!(!h.cache.is_blocked());
    assert!(h.cache.mshrs().is_empty());
}

// ══════════════════════════════════════════════════════════
// 2. Blocking variant
// ══════════════════════════════════════════════════════════

#[test]
fn blocking_cache_allows_one_miss() {
    let mut h = CacheHarness::new(CacheController::blocking(
        &SMALL,
        Box::new(RandomPolicy::new(1)),
    ));
    assert_eq!(h.cache.kind(), CacheKind::Blocking);
    assert_eq!(h.cache.mshrs().capacity(), 1);

    assert!(h.load(1, 0x00, 1));
    assert!(h.cache.is_blocked());
    assert!(!h.load(2, 0x08, 1));

    h.fill(1);
    assert!(!h.cache.is_blocked());
    assert!(h.load(2, 0x00, 1));
    assert_eq!(h.processor.ids(), vec![1, 2]);
}

/// The blocking variant ignores the configured MSHR count.
#[test]
fn blocking_kind_forces_single_mshr() {
    let cache = CacheController::new(&SMALL, CacheKind::Blocking, 8, Box::new(RandomPolicy::new(1)));
    assert_eq!(cache.mshrs().capacity(), 1);
}

// ══════════════════════════════════════════════════════════
// 3. Structural hazards
// ══════════════════════════════════════════════════════════

/// A second miss to a block whose fill is in flight is rejected until the fill
/// lands, then hits.
#[test]
fn same_block_miss_waits_for_fill() {
    let mut h = CacheHarness::small(4);
    assert!(h.store(1, 0x20, &[0x77]));
    assert!(!h.load(2, 0x21, 1));
    assert!(!h.cache.is_blocked());
    assert_eq!(h.memory.fills().len(), 1);

    h.fill(1);
    assert!(h.load(2, 0x20, 1));
    assert_eq!(h.loaded(2), vec![0x77]);
    assert_eq!(h.cache.probe(0x20), Some(LineState::Dirty));
}

/// With every way of a set awaiting a fill, a third miss to that set is rejected
/// without evicting anything.
#[test]
fn fully_reserved_set_rejects() {
    let mut policy = MockPolicy::new();
    let _ = policy.expect_pick_victim().never();
    let mut h = CacheHarness::with_policy(4, Box::new(policy));

    assert!(h.load(1, 0x00, 1));
    assert!(h.load(2, 0x10, 1));
    assert!(!h.load(3, 0x20, 1));
    assert!(!h.cache.is_blocked());
    assert_eq!(h.memory.requests.len(), 2);

    // The other set is unaffected.
    assert!(h.load(4, 0x08, 1));

    h.fill(2);
    assert!(h.load(3, 0x20, 1));
}

/// A way reserved by an outstanding miss is never offered to the victim policy.
#[test]
fn reserved_way_is_not_evicted() {
    let mut policy = MockPolicy::new();
    let _ = policy
        .expect_pick_victim()
        .with(mockall::predicate::eq(1))
        .times(1)
        .return_const(0usize);
    let mut h = CacheHarness::with_policy(4, Box::new(policy));

    // Way 0 dirty, way 1 reserved by an outstanding miss.
    assert!(h.store(1, 0x00, &[1]));
    h.fill(1);
    assert!(h.load(2, 0x10, 1));
    h.memory.clear();

    assert!(h.load(3, 0x20, 1));
    let writebacks = h.memory.writebacks();
    assert_eq!(writebacks.len(), 1);
    assert_eq!(writebacks[0].address, 0x00);

    let lines: Vec<_> = h.cache.mshrs().entries().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 0]);
}
