//! Property-based tests for interval subtraction.
//!
//! Endpoints are whole seconds so sums compare exactly.

use ecohab_core::interval::{interval_overlap, IntervalSet};
use ecohab_core::solitude::alone_durations;
use ecohab_core::types::MouseId;
use proptest::prelude::*;
use std::collections::BTreeMap;

// Strategy: alternating gaps and span lengths, accumulated into ordered spans.
fn interval_set_strategy(max_spans: usize) -> impl Strategy<Value = IntervalSet> {
    prop::collection::vec((0u32..20, 1u32..20), 0..max_spans).prop_map(|steps| {
        let mut t = 0.0;
        let mut pairs = Vec::with_capacity(steps.len());
        for (gap, len) in steps {
            let start = t + f64::from(gap);
            let end = start + f64::from(len);
            pairs.push((start, end));
            t = end;
        }
        IntervalSet::from_pairs(pairs).expect("generated spans are ordered")
    })
}

proptest! {
    // Property: the result is still an ordered, non-overlapping set
    #[test]
    fn test_subtraction_keeps_invariant(
        a in interval_set_strategy(12),
        b in interval_set_strategy(12)
    ) {
        let diff = a.difference(&b);
        let rebuilt = IntervalSet::from_parallel(diff.starts().to_vec(), diff.ends().to_vec());
        prop_assert!(rebuilt.is_ok(), "invariant broken: {:?}", diff.to_pairs());
        for span in diff.iter() {
            prop_assert!(span.start < span.end, "zero-length span retained: {:?}", span);
        }
    }

    // Property: nothing of the result overlaps what was subtracted
    #[test]
    fn test_subtraction_removes_overlap(
        a in interval_set_strategy(12),
        b in interval_set_strategy(12)
    ) {
        let diff = a.difference(&b);
        prop_assert_eq!(diff.overlap_duration(&b), 0.0);
    }

    // Property: |A| = |A - B| + |A ∩ B|
    #[test]
    fn test_duration_conservation(
        a in interval_set_strategy(12),
        b in interval_set_strategy(12)
    ) {
        let diff = a.difference(&b);
        let lhs = a.total_duration();
        let rhs = diff.total_duration() + a.overlap_duration(&b);
        prop_assert!((lhs - rhs).abs() < 1e-9, "{} != {}", lhs, rhs);
    }

    // Property: subtracting the same set twice changes nothing more
    #[test]
    fn test_double_subtraction_idempotent(
        a in interval_set_strategy(12),
        b in interval_set_strategy(12)
    ) {
        let once = a.difference(&b);
        let twice = once.difference(&b);
        prop_assert_eq!(once, twice);
    }

    // Property: overlap is symmetric and matches the pairwise definition
    #[test]
    fn test_overlap_symmetry(
        a in interval_set_strategy(10),
        b in interval_set_strategy(10)
    ) {
        let ab = a.overlap_duration(&b);
        let ba = b.overlap_duration(&a);
        prop_assert!((ab - ba).abs() < 1e-9);

        let pairwise: f64 = a
            .iter()
            .flat_map(|x| b.iter().map(move |y| interval_overlap(x, y)))
            .sum();
        prop_assert!((ab - pairwise).abs() < 1e-9);
    }

    // Property: alone time never exceeds occupancy
    #[test]
    fn test_alone_time_bounded(
        a in interval_set_strategy(8),
        b in interval_set_strategy(8),
        c in interval_set_strategy(8)
    ) {
        let mut cage = BTreeMap::new();
        cage.insert(MouseId::from("a"), a.clone());
        cage.insert(MouseId::from("b"), b);
        cage.insert(MouseId::from("c"), c);
        let alone = alone_durations(&cage);
        prop_assert!(alone[&MouseId::from("a")] <= a.total_duration() + 1e-9);
        prop_assert!(alone.values().all(|&d| d >= 0.0));
    }
}
