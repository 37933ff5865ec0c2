//! The ordered-arithmetic capability required by the arithmetic modifiers,
//! bounded values and layered stats.

use std::fmt::{Debug, Display};

use num_traits::Num;

/// Numbers usable in modifier arithmetic and clamping.
///
/// Identity elements come from [`num_traits::Zero`] and [`num_traits::One`],
/// so a type without them is rejected at compile time.
pub trait Numeric: Num + Copy + PartialOrd + Display + Debug + 'static {
    /// Clamp into `[lower, upper]`. When the bounds cross, `lower` wins.
    #[must_use]
    fn clamp_between(self, lower: Self, upper: Self) -> Self {
        let capped = if self > upper { upper } else { self };
        if capped < lower { lower } else { capped }
    }
}

impl<T> Numeric for T where T: Num + Copy + PartialOrd + Display + Debug + 'static {}
