#![forbid(unsafe_code)]

//! A base value folded through an ordered modifier chain.
//!
//! # Design
//!
//! [`ModifiableValue<T, B>`] owns a [`ModifierSet<T>`] and reads its base
//! through any [`Readable<T>`] `B`: an [`Observable`] by default, a
//! [`Derived`] for function or value-backed forms, or another modifiable
//! value. The computed value is never cached.
//!
//! At construction the value subscribes once to its base and once to its
//! chain, and re-raises both on its own [`Notifier`]: base changes as
//! [`Change::Value`], chain changes as [`Change::Modifiers`]. Observers do not
//! have to care where a change started.
//!
//! # Failure Modes
//!
//! - **Base shared with other owners**: each owner holds its own
//!   subscription, which is released when that owner is dropped.
//! - **Subscriber writes during notification**: allowed; the chain is folded
//!   from a snapshot and no internal borrow is held while callbacks run.

use std::fmt;
use std::rc::Rc;

use crate::modifier::ModifierSet;
use crate::reactive::{
    Change, ChangeTrigger, Derived, Notifier, Observable, Readable, Subscription, Writable,
};

struct ModifiableInner<T, B> {
    base: B,
    modifiers: ModifierSet<T>,
    notifier: Rc<Notifier>,
    /// Base and chain subscriptions, released with the value.
    _links: [Subscription; 2],
}

/// A value computed as `base` run through every enabled modifier, in
/// ascending `(priority, insertion)` order.
///
/// Cloning creates a new handle to the **same** value and chain.
pub struct ModifiableValue<T, B = Observable<T>> {
    inner: Rc<ModifiableInner<T, B>>,
}

impl<T, B> Clone for ModifiableValue<T, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ModifiableValue<T> {
    /// A modifiable value over a stored base.
    pub fn new(base: T) -> Self {
        Self::with_base(Observable::new(base))
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for ModifiableValue<T> {
    fn default() -> Self {
        Self::with_base(Observable::default())
    }
}

impl<T: 'static> ModifiableValue<T, Derived<T>> {
    /// Base computed by `f` on every read. Fire the returned trigger when the
    /// data `f` reads has changed.
    pub fn from_fn(f: impl Fn() -> T + 'static) -> (Self, ChangeTrigger) {
        let (base, trigger) = Derived::from_fn(f);
        (Self::with_base(base), trigger)
    }

    /// Base read from another value, following its notifications until
    /// [`detach_base`](Self::detach_base).
    pub fn from_source(source: impl Readable<T> + 'static) -> Self {
        Self::with_base(Derived::from_source(source))
    }

    /// Stop following the base source. Reads still go to it.
    pub fn detach_base(&self) {
        self.inner.base.detach();
    }
}

impl<T: 'static, B: Readable<T>> ModifiableValue<T, B> {
    /// A modifiable value over any readable base.
    pub fn with_base(base: B) -> Self {
        let notifier = Rc::new(Notifier::new());
        let modifiers = ModifierSet::new();
        let base_link = base.subscribe_with(reraise(&notifier, Change::Value));
        let chain_link = {
            let forward = reraise(&notifier, Change::Modifiers);
            modifiers.subscribe(move |change: Change| forward(change))
        };
        Self {
            inner: Rc::new(ModifiableInner {
                base,
                modifiers,
                notifier,
                _links: [base_link, chain_link],
            }),
        }
    }
}

impl<T, B: Readable<T>> ModifiableValue<T, B> {
    /// The unmodified input.
    #[must_use]
    pub fn base_value(&self) -> T {
        self.inner.base.value()
    }

    #[must_use]
    pub fn base(&self) -> &B {
        &self.inner.base
    }

    /// The chain; add or remove modifiers through it.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierSet<T> {
        &self.inner.modifiers
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }
}

impl<T, B: Writable<T>> ModifiableValue<T, B> {
    /// Write the base. Equal writes are ignored by the base.
    pub fn set_base_value(&self, value: T) {
        self.inner.base.set_value(value);
    }

    /// Read, transform and write back the base.
    pub fn update_base(&self, f: impl FnOnce(T) -> T) {
        self.inner.base.update(f);
    }
}

impl<T: fmt::Display, B: Readable<T>> ModifiableValue<T, B> {
    /// Render base, chain and result, e.g. `"base" 100 +5 *1.1 -> 115.5`.
    ///
    /// Disabled modifiers are listed with a marker; they do not contribute.
    #[must_use]
    pub fn describe(&self) -> String {
        use std::fmt::Write as _;

        let mut out = format!("\"base\" {}", self.base_value());
        for modifier in self.modifiers() {
            let _ = write!(out, " {modifier}");
        }
        let _ = write!(out, " -> {}", self.value());
        out
    }
}

impl<T, B: Readable<T>> Readable<T> for ModifiableValue<T, B> {
    fn value(&self) -> T {
        self.inner.modifiers.apply(self.inner.base.value())
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.inner.notifier.subscribe(callback)
    }
}

impl<T: fmt::Display, B: Readable<T>> fmt::Display for ModifiableValue<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

impl<T: fmt::Debug, B: Readable<T>> fmt::Debug for ModifiableValue<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifiableValue")
            .field("base", &self.base_value())
            .field("modifiers", &self.inner.modifiers)
            .field("value", &self.value())
            .finish()
    }
}

/// Callback that re-raises any change on `notifier` as `as_change`.
fn reraise(notifier: &Rc<Notifier>, as_change: Change) -> Rc<dyn Fn(Change)> {
    let weak = Rc::downgrade(notifier);
    Rc::new(move |_: Change| {
        if let Some(notifier) = weak.upgrade() {
            notifier.notify(as_change);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::Modifier;
    use std::cell::{Cell, RefCell};

    fn recorder() -> (Rc<RefCell<Vec<Change>>>, impl Fn(Change) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |change: Change| sink.borrow_mut().push(change))
    }

    #[test]
    fn no_modifiers_yields_base() {
        let v = ModifiableValue::new(42);
        assert_eq!(v.value(), 42);
        assert_eq!(v.base_value(), 42);
    }

    #[test]
    fn default_uses_default_base() {
        let v: ModifiableValue<i32> = ModifiableValue::default();
        assert_eq!(v.value(), 0);
    }

    #[test]
    fn folds_in_priority_order() {
        let v = ModifiableValue::new(10);
        v.modifiers().add_at(1, Modifier::times(3));
        v.modifiers().add_at(0, Modifier::plus(2));
        assert_eq!(v.value(), 36);
    }

    #[test]
    fn base_write_reraised_as_value() {
        let v = ModifiableValue::new(1);
        let (log, callback) = recorder();
        let _sub = v.subscribe(callback);

        v.set_base_value(1);
        assert!(log.borrow().is_empty());
        v.set_base_value(2);
        assert_eq!(*log.borrow(), vec![Change::Value]);
    }

    #[test]
    fn chain_changes_reraised_as_modifiers() {
        let v = ModifiableValue::new(1);
        let (log, callback) = recorder();
        let _sub = v.subscribe(callback);

        let m = Modifier::plus(1);
        v.modifiers().add(m.clone());
        m.disable();
        v.modifiers().remove(&m);
        assert_eq!(
            *log.borrow(),
            vec![Change::Modifiers, Change::Modifiers, Change::Modifiers]
        );
    }

    #[test]
    fn from_fn_base_recomputes() {
        let data = Rc::new(Cell::new(5));
        let d = Rc::clone(&data);
        let (v, trigger) = ModifiableValue::from_fn(move || d.get());
        v.modifiers().add(Modifier::plus(1));
        data.set(9);
        assert_eq!(v.value(), 10);

        let (log, callback) = recorder();
        let _sub = v.subscribe(callback);
        trigger.announce();
        assert_eq!(*log.borrow(), vec![Change::Value]);
    }

    #[test]
    fn from_source_follows_until_detached() {
        let source = Observable::new(3);
        let v = ModifiableValue::from_source(source.clone());
        let (log, callback) = recorder();
        let _sub = v.subscribe(callback);

        source.set(4);
        assert_eq!(log.borrow().len(), 1);
        v.detach_base();
        source.set(5);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(v.value(), 5);
    }

    #[test]
    fn modifiable_as_base_of_another() {
        let inner = ModifiableValue::new(10);
        let outer = ModifiableValue::with_base(inner.clone());
        outer.modifiers().add(Modifier::times(2));
        let (log, callback) = recorder();
        let _sub = outer.subscribe(callback);

        inner.modifiers().add(Modifier::plus(5));
        assert_eq!(outer.value(), 30);
        assert_eq!(*log.borrow(), vec![Change::Value]);
    }

    #[test]
    fn describe_lists_chain() {
        let v = ModifiableValue::new(100);
        v.modifiers().add(Modifier::plus(5));
        v.modifiers().add(Modifier::minus(20).with_name("curse"));
        assert_eq!(v.describe(), "\"base\" 100 +5 curse -> 85");
        assert_eq!(v.to_string(), "85");

        v.modifiers().clear();
        assert_eq!(v.describe(), "\"base\" 100 -> 100");
    }

    #[test]
    fn update_base_reads_and_writes() {
        let v = ModifiableValue::new(100);
        v.modifiers().add(Modifier::times(2));
        v.update_base(|b| b - 15);
        assert_eq!(v.base_value(), 85);
        assert_eq!(v.value(), 170);
    }

    #[test]
    fn dropping_value_releases_base_subscription() {
        let source = Observable::new(1);
        let v = ModifiableValue::with_base(source.clone());
        assert_eq!(source.subscriber_count(), 1);
        drop(v);
        assert_eq!(source.subscriber_count(), 0);
    }
}
