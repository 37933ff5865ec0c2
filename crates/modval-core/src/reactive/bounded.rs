#![forbid(unsafe_code)]

//! Values clamped to a lower and upper bound.
//!
//! # Invariants
//!
//! 1. After construction, after every write, and after every bound change,
//!    `lower <= value <= upper` holds whenever `lower <= upper`.
//! 2. A bound change re-clamps the currently **stored** value, not the value
//!    originally requested.
//! 3. Subscribers hear about a write or a re-clamp only when the stored value
//!    actually moved.
//! 4. When the bounds cross, clamping yields the lower bound.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::notify::{Change, Notifier, Readable, Subscription, Writable};
use crate::error::{Error, Result};
use crate::logging::{debug, trace};
use crate::numeric::Numeric;

/// One side of a [`Bounded`] range.
pub enum Bound<T> {
    /// A bound that never moves.
    Fixed(T),
    /// A bound that follows another value.
    Tracking(Rc<dyn Readable<T>>),
}

impl<T: Copy> Bound<T> {
    /// Follow `source`. The bounded value re-clamps whenever it changes.
    pub fn tracking(source: impl Readable<T> + 'static) -> Self {
        Self::Tracking(Rc::new(source))
    }

    #[must_use]
    pub fn current(&self) -> T {
        match self {
            Self::Fixed(value) => *value,
            Self::Tracking(source) => source.value(),
        }
    }

    fn watch(&self, callback: Rc<dyn Fn(Change)>) -> Option<Subscription> {
        match self {
            Self::Fixed(_) => None,
            Self::Tracking(source) => Some(source.subscribe_with(callback)),
        }
    }
}

impl<T> From<T> for Bound<T> {
    fn from(value: T) -> Self {
        Self::Fixed(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Tracking(_) => f.write_str("Tracking(..)"),
        }
    }
}

struct BoundedInner<T> {
    value: Cell<T>,
    lower: Bound<T>,
    upper: Bound<T>,
    notifier: Notifier,
    /// Keep the bound callbacks registered for as long as the value lives.
    _links: Vec<Subscription>,
}

impl<T: Numeric> BoundedInner<T> {
    /// Clamp `requested` and store it. Returns whether the stored value moved.
    fn store(&self, requested: T) -> bool {
        let lower = self.lower.current();
        let upper = self.upper.current();
        let clamped = requested.clamp_between(lower, upper);
        if clamped != requested {
            trace!(message = "bounded.clamp", requested = %requested, clamped = %clamped);
        }
        if clamped == self.value.get() {
            return false;
        }
        self.value.set(clamped);
        self.notifier.notify(Change::Value);
        true
    }

    fn reclamp(&self) {
        if self.store(self.value.get()) {
            debug!(message = "bounded.reclamp", value = %self.value.get());
        }
    }
}

/// A numeric value kept inside `[lower, upper]`.
///
/// Cloning a `Bounded` creates a new handle to the **same** value.
pub struct Bounded<T> {
    inner: Rc<BoundedInner<T>>,
}

impl<T> Clone for Bounded<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Numeric> fmt::Debug for Bounded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bounded")
            .field("value", &self.inner.value.get())
            .field("lower", &self.inner.lower)
            .field("upper", &self.inner.upper)
            .finish()
    }
}

impl<T: Numeric> Bounded<T> {
    /// Create a bounded value. Either bound may be a plain number or a
    /// [`Bound::tracking`] reference to another value.
    ///
    /// The initial value is clamped.
    pub fn with_bounds(value: T, lower: impl Into<Bound<T>>, upper: impl Into<Bound<T>>) -> Self {
        let lower = lower.into();
        let upper = upper.into();
        let initial = value.clamp_between(lower.current(), upper.current());

        let inner = Rc::new_cyclic(|weak: &Weak<BoundedInner<T>>| {
            let on_bound_change: Rc<dyn Fn(Change)> = {
                let weak = weak.clone();
                Rc::new(move |_: Change| {
                    if let Some(inner) = weak.upgrade() {
                        inner.reclamp();
                    }
                })
            };
            let links = [&lower, &upper]
                .into_iter()
                .filter_map(|bound| bound.watch(Rc::clone(&on_bound_change)))
                .collect();
            BoundedInner {
                value: Cell::new(initial),
                lower,
                upper,
                notifier: Notifier::new(),
                _links: links,
            }
        });
        Self { inner }
    }

    /// Like [`with_bounds`](Self::with_bounds), but rejects bounds that are
    /// already crossed.
    pub fn try_with_bounds(
        value: T,
        lower: impl Into<Bound<T>>,
        upper: impl Into<Bound<T>>,
    ) -> Result<Self> {
        let lower = lower.into();
        let upper = upper.into();
        let (low, high) = (lower.current(), upper.current());
        if low > high {
            return Err(Error::crossed(low, high));
        }
        Ok(Self::with_bounds(value, lower, upper))
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.get()
    }

    /// Clamp and store `value`. Returns whether the stored value changed.
    pub fn set(&self, value: T) -> bool {
        self.inner.store(value)
    }

    #[must_use]
    pub fn lower(&self) -> T {
        self.inner.lower.current()
    }

    #[must_use]
    pub fn upper(&self) -> T {
        self.inner.upper.current()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }
}

impl<T: Numeric> Readable<T> for Bounded<T> {
    fn value(&self) -> T {
        self.get()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.inner.notifier.subscribe(callback)
    }
}

impl<T: Numeric> Writable<T> for Bounded<T> {
    fn set_value(&self, value: T) {
        self.set(value);
    }
}

impl<T: Numeric> fmt::Display for Bounded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observable;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(Change) + 'static) {
        let count = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&count);
        (count, move |_: Change| sink.set(sink.get() + 1))
    }

    #[test]
    fn set_clamps_into_range() {
        let hp = Bounded::with_bounds(50, 0, 100);
        hp.set(150);
        assert_eq!(hp.get(), 100);
        hp.set(-20);
        assert_eq!(hp.get(), 0);
        hp.set(42);
        assert_eq!(hp.get(), 42);
    }

    #[test]
    fn initial_value_is_clamped() {
        let hp = Bounded::with_bounds(500.0_f32, 0.0, 100.0);
        assert_eq!(hp.get(), 100.0);
    }

    #[test]
    fn clamped_to_current_value_is_silent() {
        let hp = Bounded::with_bounds(100, 0, 100);
        let (count, callback) = counter();
        let _sub = hp.subscribe(callback);

        assert!(!hp.set(120));
        assert_eq!(count.get(), 0);
        assert!(hp.set(80));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn tracking_upper_bound_reclamps_stored_value() {
        let max = Observable::new(100);
        let hp = Bounded::with_bounds(90, 0, Bound::tracking(max.clone()));
        let (count, callback) = counter();
        let _sub = hp.subscribe(callback);

        max.set(60);
        assert_eq!(hp.get(), 60);
        assert_eq!(count.get(), 1);

        // Raising the cap does not restore the old value.
        max.set(100);
        assert_eq!(hp.get(), 60);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn tracking_lower_bound_pushes_value_up() {
        let floor = Observable::new(0);
        let v = Bounded::with_bounds(5, Bound::tracking(floor.clone()), 10);
        floor.set(7);
        assert_eq!(v.get(), 7);
    }

    #[test]
    fn crossed_bounds_resolve_to_lower() {
        let v = Bounded::with_bounds(5, 8, 2);
        assert_eq!(v.get(), 8);
    }

    #[test]
    fn try_with_bounds_rejects_crossed() {
        let err = Bounded::try_with_bounds(5, 8, 2).unwrap_err();
        assert!(matches!(err, Error::CrossedBounds { .. }));
        assert_eq!(err.to_string(), "lower bound 8 exceeds upper bound 2");
        assert!(Bounded::try_with_bounds(5, 2, 8).is_ok());
    }

    #[test]
    fn update_is_clamped() {
        let hp = Bounded::with_bounds(85.0_f64, 0.0, 100.0);
        hp.update(|v| v + 25.0);
        assert_eq!(hp.get(), 100.0);
    }

    #[test]
    fn dropping_bounded_releases_bound_callbacks() {
        let max = Observable::new(10);
        let v = Bounded::with_bounds(3, 0, Bound::tracking(max.clone()));
        assert_eq!(max.subscriber_count(), 1);
        drop(v);
        assert_eq!(max.subscriber_count(), 0);
    }
}
