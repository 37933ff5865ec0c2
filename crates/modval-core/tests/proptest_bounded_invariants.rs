//! Property-based invariant tests for bounded values.
//!
//! 1. After any sequence of writes and bound changes, `lower <= value <= upper`
//!    holds whenever `lower <= upper`.
//! 2. With crossed bounds the stored value equals the lower bound.
//! 3. Subscribers are notified exactly when the stored value moves.
//! 4. `try_with_bounds` accepts exactly the uncrossed bound pairs.

use std::cell::Cell;
use std::rc::Rc;

use modval_core::{Bound, Bounded, Change, Error, Observable, Readable};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Step {
    Write(i32),
    Lower(i32),
    Upper(i32),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (-500i32..=500).prop_map(Step::Write),
        1 => (-500i32..=500).prop_map(Step::Lower),
        1 => (-500i32..=500).prop_map(Step::Upper),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Random write / bound-change sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn value_stays_within_tracking_bounds(
        initial in -500i32..=500,
        lower0 in -500i32..=0,
        upper0 in 0i32..=500,
        steps in proptest::collection::vec(step_strategy(), 0..32),
    ) {
        let lower = Observable::new(lower0);
        let upper = Observable::new(upper0);
        let value = Bounded::with_bounds(
            initial,
            Bound::tracking(lower.clone()),
            Bound::tracking(upper.clone()),
        );

        let notified = Rc::new(Cell::new(0u32));
        let n = Rc::clone(&notified);
        let _sub = value.subscribe(move |_: Change| n.set(n.get() + 1));

        for step in steps {
            let before = value.get();
            let before_count = notified.get();
            match step {
                Step::Write(v) => {
                    value.set(v);
                }
                Step::Lower(v) => {
                    lower.set(v);
                }
                Step::Upper(v) => {
                    upper.set(v);
                }
            }
            let (lo, hi, v) = (lower.get(), upper.get(), value.get());

            if lo <= hi {
                prop_assert!(lo <= v && v <= hi, "{} not in [{}, {}]", v, lo, hi);
            } else {
                prop_assert_eq!(v, lo);
            }

            let moved = u32::from(before != v);
            prop_assert_eq!(notified.get() - before_count, moved);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Crossed fixed bounds resolve to the lower bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn crossed_fixed_bounds_yield_lower(v in any::<i32>(), lower in 1i32..1000, gap in 1i32..1000) {
        let upper = lower - gap;
        let value = Bounded::with_bounds(v, lower, upper);
        prop_assert_eq!(value.get(), lower);
        value.set(v.wrapping_add(1));
        prop_assert_eq!(value.get(), lower);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. try_with_bounds validation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn try_with_bounds_accepts_uncrossed_only(v in any::<i32>(), a in any::<i32>(), b in any::<i32>()) {
        match Bounded::try_with_bounds(v, a, b) {
            Ok(value) => {
                prop_assert!(a <= b);
                prop_assert!(a <= value.get() && value.get() <= b);
            }
            Err(Error::CrossedBounds { .. }) => prop_assert!(a > b),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
