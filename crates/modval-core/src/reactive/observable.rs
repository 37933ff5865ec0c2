#![forbid(unsafe_code)]

//! Mutable observable cell and its read-only counterpart.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::notify::{Change, Notifier, Readable, Subscription, Writable};
use crate::logging::trace;

struct ObservableInner<T> {
    value: RefCell<T>,
    /// Set for default-constructed cells until the first write.
    unset: Cell<bool>,
    version: Cell<u64>,
    notifier: Notifier,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** cell.
///
/// # Invariants
///
/// 1. A write equal to the current value is a no-op: no version bump, no
///    notification.
/// 2. A write that differs bumps the version by 1 and notifies exactly once
///    with [`Change::Value`].
/// 3. A default-constructed cell counts as unset, so its first write always
///    notifies.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field("subscribers", &self.inner.notifier.subscriber_count())
            .finish()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        let observable = Self::new(T::default());
        observable.inner.unset.set(true);
        observable
    }
}

impl<T> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                unset: Cell::new(false),
                version: Cell::new(0),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Access the value by reference without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes to this same observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of effective writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }

    /// Whether both handles point at the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Observable<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Store `value` and notify, unless it equals the current value.
    ///
    /// Returns whether the write took effect.
    pub fn set(&self, value: T) -> bool {
        let first_write = self.inner.unset.replace(false);
        {
            let mut current = self.inner.value.borrow_mut();
            if !first_write && *current == value {
                return false;
            }
            *current = value;
        }
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        trace!(message = "observable.set", version);
        self.inner.notifier.notify(Change::Value);
        true
    }

    /// Apply `f` to the current value in place, notifying if it changed.
    pub fn modify(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }
}

impl<T: Clone> Readable<T> for Observable<T> {
    fn value(&self) -> T {
        self.get()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.inner.notifier.subscribe(callback)
    }
}

impl<T: Clone + PartialEq> Writable<T> for Observable<T> {
    fn set_value(&self, value: T) {
        self.set(value);
    }
}

impl<T: fmt::Display> fmt::Display for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.value.borrow(), f)
    }
}

/// A value that never changes.
///
/// Subscribing is allowed and returns an inert [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constant<T>(T);

impl<T> Constant<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Clone> Readable<T> for Constant<T> {
    fn value(&self) -> T {
        self.0.clone()
    }

    fn subscribe_with(&self, _callback: Rc<dyn Fn(Change)>) -> Subscription {
        Subscription::inert()
    }
}

impl<T: fmt::Display> fmt::Display for Constant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
