#![forbid(unsafe_code)]

//! Values computed from a function or from another value.
//!
//! # Design
//!
//! A [`Derived<T>`] wraps a compute function in shared, reference-counted
//! storage. Nothing is cached: every [`value()`](Readable::value) call runs
//! the function, so a read always reflects the current state of whatever the
//! function looks at.
//!
//! Change notification depends on the source:
//!
//! - **Function sources** are opaque. [`Derived::from_fn`] hands back a
//!   [`ChangeTrigger`] that the owner fires when it knows the inputs changed.
//! - **Value sources** are observable. [`Derived::from_source`] and
//!   [`Derived::map`] subscribe to the source and re-emit its notifications
//!   until [`Derived::detach`] is called.
//!
//! # Failure Modes
//!
//! - **Source dropped first**: the source handle captured by the compute
//!   function keeps the source's storage alive, so reads keep working.
//! - **Derived dropped first**: the source subscription only holds a `Weak`
//!   reference to the derived value's subscribers, so nothing dangles; the
//!   callback is released with the derived value.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::notify::{Change, Notifier, Readable, Subscription, Writable};
use crate::logging::debug;

/// Fires a change notification on a function-backed value.
///
/// Returned by [`Derived::from_fn`] and [`DerivedMut::from_fns`]. Firing after
/// the value was dropped does nothing.
#[derive(Clone)]
pub struct ChangeTrigger {
    notifier: Weak<Notifier>,
}

impl ChangeTrigger {
    fn new(notifier: &Rc<Notifier>) -> Self {
        Self {
            notifier: Rc::downgrade(notifier),
        }
    }

    /// Tell the value's subscribers that it changed.
    pub fn announce(&self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.notify(Change::Value);
        }
    }

    /// Whether the value this trigger belongs to is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.notifier.strong_count() > 0
    }
}

impl fmt::Debug for ChangeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTrigger")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Forward every notification of a source to `notifier`.
pub(crate) fn relay<S, R>(source: &R, notifier: &Rc<Notifier>) -> Subscription
where
    R: Readable<S> + ?Sized,
{
    let weak = Rc::downgrade(notifier);
    source.subscribe_with(Rc::new(move |change: Change| {
        if let Some(notifier) = weak.upgrade() {
            notifier.notify(change);
        }
    }))
}

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T>,
    notifier: Rc<Notifier>,
    /// Subscription to the source, for value-backed forms.
    link: RefCell<Option<Subscription>>,
}

/// A read-only value recomputed on every read.
///
/// Cloning a `Derived` creates a new handle to the **same** inner state.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("attached", &self.is_attached())
            .field("subscribers", &self.inner.notifier.subscriber_count())
            .finish()
    }
}

impl<T: 'static> Derived<T> {
    fn build(
        compute: Box<dyn Fn() -> T>,
        notifier: Rc<Notifier>,
        link: Option<Subscription>,
    ) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                compute,
                notifier,
                link: RefCell::new(link),
            }),
        }
    }

    /// Derive from an opaque function.
    ///
    /// The function cannot be watched, so the caller fires the returned
    /// trigger whenever it knows the result changed.
    pub fn from_fn(f: impl Fn() -> T + 'static) -> (Self, ChangeTrigger) {
        let notifier = Rc::new(Notifier::new());
        let trigger = ChangeTrigger::new(&notifier);
        (Self::build(Box::new(f), notifier, None), trigger)
    }

    /// Mirror another value. Its notifications are re-emitted until
    /// [`detach`](Self::detach).
    pub fn from_source<R>(source: R) -> Self
    where
        R: Readable<T> + 'static,
    {
        Self::map(source, |v| v)
    }

    /// Derive from another value through `f`.
    pub fn map<S, R>(source: R, f: impl Fn(S) -> T + 'static) -> Self
    where
        R: Readable<S> + 'static,
    {
        let notifier = Rc::new(Notifier::new());
        let link = relay(&source, &notifier);
        Self::build(Box::new(move || f(source.value())), notifier, Some(link))
    }
}

impl<T> Derived<T> {
    /// Stop re-emitting the source's notifications. Reads still go to the
    /// source. Calling this twice is a no-op.
    pub fn detach(&self) {
        if self.inner.link.borrow_mut().take().is_some() {
            debug!(message = "derived.detach");
        }
    }

    /// Whether the source subscription is still in place. Always false for
    /// function-backed values.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.link.borrow().is_some()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }
}

impl<T> Readable<T> for Derived<T> {
    fn value(&self) -> T {
        (self.inner.compute)()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.inner.notifier.subscribe(callback)
    }
}

impl<T: fmt::Display> fmt::Display for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

struct DerivedMutInner<T> {
    get: Box<dyn Fn() -> T>,
    set: Box<dyn Fn(T)>,
    notifier: Rc<Notifier>,
}

/// A getter/setter pair exposed as a writable value.
///
/// Like [`Derived::from_fn`], change notification is manual: writes go to
/// the setter and nothing is announced until the trigger fires.
pub struct DerivedMut<T> {
    inner: Rc<DerivedMutInner<T>>,
}

impl<T> Clone for DerivedMut<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for DerivedMut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedMut")
            .field("subscribers", &self.inner.notifier.subscriber_count())
            .finish()
    }
}

impl<T: 'static> DerivedMut<T> {
    pub fn from_fns(
        get: impl Fn() -> T + 'static,
        set: impl Fn(T) + 'static,
    ) -> (Self, ChangeTrigger) {
        let notifier = Rc::new(Notifier::new());
        let trigger = ChangeTrigger::new(&notifier);
        let value = Self {
            inner: Rc::new(DerivedMutInner {
                get: Box::new(get),
                set: Box::new(set),
                notifier,
            }),
        };
        (value, trigger)
    }
}

impl<T> Readable<T> for DerivedMut<T> {
    fn value(&self) -> T {
        (self.inner.get)()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.inner.notifier.subscribe(callback)
    }
}

impl<T> Writable<T> for DerivedMut<T> {
    fn set_value(&self, value: T) {
        (self.inner.set)(value);
    }
}
