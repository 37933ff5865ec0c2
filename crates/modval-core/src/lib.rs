#![forbid(unsafe_code)]

//! Core: observable values, modifier chains, derived and bounded values.
//!
//! A [`ModifiableValue`] folds an ordered chain of [`Modifier`]s over a base
//! value. Every read recomputes from the current base and modifier states;
//! every write to a contributing input is announced synchronously to the
//! value's subscribers.
//!
//! ```
//! use modval_core::{Modifier, ModifiableValue, Readable};
//!
//! let speed = ModifiableValue::new(10.0_f64);
//! speed.modifiers().add_at(-1, Modifier::minus(2.0));
//! speed.modifiers().add(Modifier::times(1.2));
//! assert!((speed.value() - 9.6).abs() < 1e-9);
//! ```

pub mod error;
pub mod logging;
pub mod modifiable;
pub mod modifier;
pub mod numeric;
pub mod reactive;

pub use error::{Error, Result};
pub use modifiable::ModifiableValue;
pub use modifier::{Modifier, ModifierKey, ModifierSet, RemovableBy};
pub use numeric::Numeric;
pub use reactive::{
    Bound, Bounded, Change, ChangeTrigger, Constant, Derived, DerivedMut, Notifier, Observable,
    Readable, Subscription, Writable,
};
