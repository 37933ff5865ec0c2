#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modval_core::{Bound, Bounded, Observable};

#[derive(Arbitrary, Debug)]
enum BoundOp {
    Write(i64),
    Lower(i64),
    Upper(i64),
}

fuzz_target!(|input: (i64, Vec<BoundOp>)| {
    let (initial, ops) = input;
    let lower = Observable::new(i64::MIN / 2);
    let upper = Observable::new(i64::MAX / 2);
    let value = Bounded::with_bounds(
        initial,
        Bound::tracking(lower.clone()),
        Bound::tracking(upper.clone()),
    );

    for op in ops.into_iter().take(256) {
        match op {
            BoundOp::Write(v) => {
                value.set(v);
            }
            BoundOp::Lower(v) => {
                lower.set(v);
            }
            BoundOp::Upper(v) => {
                upper.set(v);
            }
        }
        let (lo, hi, v) = (lower.get(), upper.get(), value.get());
        if lo <= hi {
            assert!(lo <= v && v <= hi);
        } else {
            assert_eq!(v, lo);
        }
    }
});
