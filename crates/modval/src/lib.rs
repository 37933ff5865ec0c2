#![forbid(unsafe_code)]

//! modval public facade crate.
//!
//! Reactive values with priority-ordered modifier chains.
//!
//! ```
//! use modval::prelude::*;
//!
//! let max_health = ModifiableValue::new(100);
//! let health = Bounded::with_bounds(100, 0, Bound::tracking(max_health.clone()));
//!
//! let curse = Modifier::minus(40).with_removable_by(RemovableBy::CURE);
//! max_health.modifiers().add(curse);
//! assert_eq!(health.get(), 60);
//! ```

pub use modval_core;
#[cfg(feature = "extras")]
pub use modval_extras;

#[cfg(feature = "tracing-json")]
pub use modval_core::logging::init_json_logging;

pub mod prelude {
    pub use modval_core::{
        Bound, Bounded, Change, ChangeTrigger, Constant, Derived, DerivedMut, ModifiableValue,
        Modifier, ModifierKey, ModifierSet, Numeric, Observable, Readable, RemovableBy,
        Subscription, Writable,
    };
    #[cfg(feature = "extras")]
    pub use modval_extras::{LayeredStat, TagRemoval};
}
