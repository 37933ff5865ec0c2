#![forbid(unsafe_code)]

//! Change notification plumbing shared by every value type.
//!
//! # Design
//!
//! A [`Notifier`] keeps its subscribers as `Weak` callbacks. The strong
//! reference lives in the [`Subscription`] handed back to the caller, so the
//! subscriber decides how long it listens: dropping the guard (or calling
//! [`Subscription::detach`]) is enough to stop delivery.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. A detached subscription is never invoked again.
//! 3. Delivery is synchronous: `notify` returns after every live callback ran.
//! 4. Callbacks may re-enter (write other values, subscribe, detach) because
//!    the subscriber list is not borrowed while callbacks run.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// What changed on a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The value (or a base the value reads from) changed.
    Value,
    /// The modifier chain changed: an add, a remove, a clear, or a change
    /// inside one of the held modifiers.
    Modifiers,
    /// A modifier was enabled or disabled.
    Enabled,
}

impl Change {
    /// Attribute name of the change, as used in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Modifiers => "modifiers",
            Self::Enabled => "enabled",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Callback = dyn Fn(Change);

/// Subscriber list with weak callback storage.
#[derive(Default)]
pub struct Notifier {
    subscribers: RefCell<Vec<Weak<Callback>>>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered while the returned guard is
    /// alive and not detached.
    pub fn subscribe(&self, callback: Rc<Callback>) -> Subscription {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|weak| weak.strong_count() > 0);
        subscribers.push(Rc::downgrade(&callback));
        drop(subscribers);
        Subscription {
            callback: Some(callback),
        }
    }

    /// Deliver `change` to every live subscriber.
    ///
    /// Each callback is upgraded right before it runs, so one detached by an
    /// earlier callback in the same round is skipped.
    pub fn notify(&self, change: Change) {
        let round: Vec<Weak<Callback>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.clone()
        };
        for weak in round {
            if let Some(callback) = weak.upgrade() {
                callback(change);
            }
        }
    }

    /// Length of the stored list, dead entries included.
    #[cfg(test)]
    fn stored(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Number of subscribers that would receive the next notification.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// RAII guard for a registered callback.
///
/// Dropping the guard unsubscribes. [`detach`](Self::detach) does the same
/// explicitly and is safe to call more than once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    callback: Option<Rc<Callback>>,
}

impl Subscription {
    /// A subscription that was never registered anywhere. Returned by values
    /// that cannot change.
    pub fn inert() -> Self {
        Self { callback: None }
    }

    /// Stop receiving notifications.
    pub fn detach(&mut self) {
        self.callback = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Anything with a current value and change notification.
///
/// Implemented by every value type in this crate, so any of them can serve
/// as a modifiable value's base, a bound, or the input of a modifier.
pub trait Readable<T> {
    /// Current value. Derived values recompute on every call.
    fn value(&self) -> T;

    /// Register a shared callback. Prefer [`subscribe`](Self::subscribe).
    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription;

    /// Register a callback for changes to this value.
    fn subscribe(&self, callback: impl Fn(Change) + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.subscribe_with(Rc::new(callback))
    }
}

/// A [`Readable`] that accepts writes.
pub trait Writable<T>: Readable<T> {
    /// Store `value`. Implementations skip the write, and the notification,
    /// when nothing would change.
    fn set_value(&self, value: T);

    /// Read, transform, write back.
    fn update(&self, f: impl FnOnce(T) -> T)
    where
        Self: Sized,
    {
        self.set_value(f(self.value()));
    }
}

impl<T, R: Readable<T> + ?Sized> Readable<T> for Rc<R> {
    fn value(&self) -> T {
        (**self).value()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        (**self).subscribe_with(callback)
    }
}
