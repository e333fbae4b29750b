// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Retention Resolution

use cim_topology::domain::RetentionClass;
use proptest::prelude::*;

proptest! {
    /// Resolution never rounds up
    #[test]
    fn prop_resolve_rounds_down(days in 1u32..10_000) {
        let class = RetentionClass::resolve(days);
        prop_assert!(class.days() <= days);
    }

    /// No supported class lies between the request and its resolution
    #[test]
    fn prop_resolve_picks_largest_fitting_class(days in 1u32..10_000) {
        let class = RetentionClass::resolve(days);
        for candidate in RetentionClass::ALL {
            if candidate.days() <= days {
                prop_assert!(candidate.days() <= class.days());
            }
        }
    }

    /// Anything below the shortest class floors at it
    #[test]
    fn prop_resolve_floors_at_minimum(days in 0u32..1) {
        prop_assert_eq!(RetentionClass::resolve(days), RetentionClass::minimum());
    }

    #[test]
    fn prop_resolve_is_idempotent(days in 0u32..20_000) {
        let once = RetentionClass::resolve(days);
        prop_assert_eq!(RetentionClass::resolve(once.days()), once);
    }

    #[test]
    fn prop_resolve_is_monotonic(a in 0u32..10_000, b in 0u32..10_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RetentionClass::resolve(low) <= RetentionClass::resolve(high));
    }
}

#[test]
fn test_exact_classes_resolve_to_themselves() {
    for class in RetentionClass::ALL {
        assert_eq!(RetentionClass::resolve(class.days()), class);
    }
}
