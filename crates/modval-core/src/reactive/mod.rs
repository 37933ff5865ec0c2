#![forbid(unsafe_code)]

//! Reactive value primitives.
//!
//! - [`Observable`]: a shared, version-tracked cell with change notification.
//! - [`Constant`]: a value that never changes.
//! - [`Derived`] / [`DerivedMut`]: values computed from a function or from
//!   another value on every read.
//! - [`Bounded`]: a numeric value clamped to fixed or tracking bounds.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Architecture
//!
//! Every value type is a cheap handle around `Rc` storage for single-threaded
//! sharing. Subscribers are stored as `Weak` callbacks and cleaned up lazily
//! during notification. Types that listen to other values (derived, bounded,
//! modifiable) keep the [`Subscription`]s inside their own storage, so
//! dropping the listener releases its callbacks.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order, synchronously.
//! 2. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 3. Dropping or detaching a [`Subscription`] removes the callback before the
//!    next notification cycle.
//! 4. Reads are never stale: derived values recompute on every read.

pub mod bounded;
pub mod derived;
pub mod notify;
pub mod observable;

pub use bounded::{Bound, Bounded};
pub use derived::{ChangeTrigger, Derived, DerivedMut};
pub use notify::{Change, Notifier, Readable, Subscription, Writable};
pub use observable::{Constant, Observable};

pub(crate) use derived::relay;
