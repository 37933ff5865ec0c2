#![forbid(unsafe_code)]

//! The modifier handle and its arithmetic factories.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::logging::debug;
use crate::numeric::Numeric;
use crate::reactive::{Change, Notifier, Readable, Subscription, relay};

bitflags! {
    /// Which kinds of effect may strip a modifier from a chain.
    ///
    /// Bulk removal filters on these flags instead of on modifier names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RemovableBy: u8 {
        /// Healing effects (potions, cleansing).
        const CURE = 1 << 0;
        /// Magic dispel.
        const DISPEL = 1 << 1;
        /// Taking off the item that granted it.
        const UNEQUIP = 1 << 2;
        /// Running out of duration.
        const EXPIRE = 1 << 3;
    }
}

struct ModifierInner<T> {
    name: RefCell<String>,
    priority: Cell<i32>,
    removable_by: Cell<RemovableBy>,
    enabled: Cell<bool>,
    transform: Box<dyn Fn(T) -> T>,
    notifier: Rc<Notifier>,
    /// Subscription to the second input, for input-driven modifiers.
    _input: Option<Subscription>,
}

/// A named, prioritized, switchable transform `T -> T`.
///
/// `Modifier` is a cheap handle; clones refer to the **same** modifier and
/// compare equal. Identity, not the transform, is what a [`ModifierSet`]
/// uses for `remove` and `contains`.
///
/// [`ModifierSet`]: super::ModifierSet
pub struct Modifier<T> {
    inner: Rc<ModifierInner<T>>,
}

impl<T> Clone for Modifier<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Modifier<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Modifier<T> {}

impl<T> fmt::Debug for Modifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("name", &*self.inner.name.borrow())
            .field("priority", &self.inner.priority.get())
            .field("enabled", &self.inner.enabled.get())
            .field("removable_by", &self.inner.removable_by.get())
            .finish()
    }
}

impl<T> fmt::Display for Modifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name.borrow())?;
        if !self.is_enabled() {
            f.write_str(" (disabled)")?;
        }
        Ok(())
    }
}

impl<T: 'static> Modifier<T> {
    fn build(
        name: String,
        transform: Box<dyn Fn(T) -> T>,
        notifier: Rc<Notifier>,
        input: Option<Subscription>,
    ) -> Self {
        Self {
            inner: Rc::new(ModifierInner {
                name: RefCell::new(name),
                priority: Cell::new(0),
                removable_by: Cell::new(RemovableBy::empty()),
                enabled: Cell::new(true),
                transform,
                notifier,
                _input: input,
            }),
        }
    }

    /// A modifier running an arbitrary transform.
    pub fn new(name: impl Into<String>, transform: impl Fn(T) -> T + 'static) -> Self {
        Self::build(
            name.into(),
            Box::new(transform),
            Rc::new(Notifier::new()),
            None,
        )
    }

    /// An unnamed modifier running an arbitrary transform.
    pub fn from_fn(transform: impl Fn(T) -> T + 'static) -> Self {
        Self::new("f(x)", transform)
    }

    /// A modifier whose transform also reads a second value.
    ///
    /// Changes to `input` are announced as changes of the modifier, so a
    /// modifiable value holding it recomputes for its subscribers.
    pub fn with_input<S, R>(
        input: R,
        name: impl Into<String>,
        transform: impl Fn(S, T) -> T + 'static,
    ) -> Self
    where
        R: Readable<S> + 'static,
    {
        let notifier = Rc::new(Notifier::new());
        let link = relay(&input, &notifier);
        Self::build(
            name.into(),
            Box::new(move |value| transform(input.value(), value)),
            notifier,
            Some(link),
        )
    }
}

impl<T: Numeric> Modifier<T> {
    /// `x + amount`
    pub fn plus(amount: T) -> Self {
        Self::new(format!("+{amount}"), move |x| x + amount)
    }

    /// `x - amount`
    pub fn minus(amount: T) -> Self {
        Self::new(format!("-{amount}"), move |x| x - amount)
    }

    /// `x * factor`
    pub fn multiply(factor: T) -> Self {
        Self::new(format!("*{factor}"), move |x| x * factor)
    }

    /// Alias of [`multiply`](Self::multiply).
    pub fn times(factor: T) -> Self {
        Self::multiply(factor)
    }

    /// `x + source.value()`, tracking `source`.
    pub fn plus_source(source: impl Readable<T> + 'static) -> Self {
        Self::with_input(source, "+source", |amount: T, x: T| x + amount)
    }

    /// `x - source.value()`, tracking `source`.
    pub fn minus_source(source: impl Readable<T> + 'static) -> Self {
        Self::with_input(source, "-source", |amount: T, x: T| x - amount)
    }

    /// `x * source.value()`, tracking `source`.
    pub fn multiply_source(source: impl Readable<T> + 'static) -> Self {
        Self::with_input(source, "*source", |factor: T, x: T| x * factor)
    }
}

impl<T> Modifier<T> {
    /// Rename the modifier.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        *self.inner.name.borrow_mut() = name.into();
        self
    }

    /// Priority used by [`ModifierSet::add`](super::ModifierSet::add).
    /// Lower runs earlier; the default is 0.
    #[must_use]
    pub fn with_priority(self, priority: i32) -> Self {
        self.inner.priority.set(priority);
        self
    }

    #[must_use]
    pub fn with_removable_by(self, removable_by: RemovableBy) -> Self {
        self.inner.removable_by.set(removable_by);
        self
    }

    /// Start out disabled.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.inner.enabled.set(false);
        self
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.inner.name.borrow().clone()
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.inner.priority.get()
    }

    #[must_use]
    pub fn removable_by(&self) -> RemovableBy {
        self.inner.removable_by.get()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Switch the modifier on or off. Notifies with [`Change::Enabled`] when
    /// the state actually flips.
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.replace(enabled) == enabled {
            return;
        }
        debug!(message = "modifier.toggle", name = %self.inner.name.borrow(), enabled);
        self.inner.notifier.notify(Change::Enabled);
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    /// Apply the transform, regardless of the enabled flag.
    pub fn modify(&self, input: T) -> T {
        (self.inner.transform)(input)
    }

    /// Register a callback for changes to this modifier: toggles, and
    /// changes of its second input.
    pub fn subscribe(&self, callback: impl Fn(Change) + 'static) -> Subscription {
        self.inner.notifier.subscribe(Rc::new(callback))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }

    /// Address of the shared storage; stable while any handle is alive.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observable;

    #[test]
    fn arithmetic_factories() {
        assert_eq!(Modifier::plus(5).modify(10), 15);
        assert_eq!(Modifier::minus(2).modify(10), 8);
        assert_eq!(Modifier::multiply(3).modify(10), 30);
        assert!((Modifier::times(1.1_f64).modify(100.0) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn default_names_and_display() {
        let m = Modifier::plus(5);
        assert_eq!(m.name(), "+5");
        assert_eq!(Modifier::times(1.5_f32).to_string(), "*1.5");
        let m = Modifier::minus(2).with_name("ailment").disabled();
        assert_eq!(m.to_string(), "ailment (disabled)");
        assert_eq!(Modifier::<i32>::from_fn(|x| x).name(), "f(x)");
    }

    #[test]
    fn builder_options() {
        let m = Modifier::plus(1)
            .with_priority(-3)
            .with_removable_by(RemovableBy::CURE | RemovableBy::DISPEL);
        assert_eq!(m.priority(), -3);
        assert!(m.removable_by().contains(RemovableBy::CURE));
        assert!(!m.removable_by().contains(RemovableBy::UNEQUIP));
        assert!(m.is_enabled());
    }

    #[test]
    fn toggle_notifies_once_per_flip() {
        let m = Modifier::plus(1);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _sub = m.subscribe(move |change: Change| sink.borrow_mut().push(change));

        m.disable();
        m.disable();
        m.enable();
        assert_eq!(*log.borrow(), vec![Change::Enabled, Change::Enabled]);
    }

    #[test]
    fn clones_share_identity() {
        let a = Modifier::plus(1);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Modifier::plus(1));
        b.disable();
        assert!(!a.is_enabled());
    }

    #[test]
    fn input_driven_modifier_reads_and_relays() {
        let bonus = Observable::new(3);
        let m = Modifier::plus_source(bonus.clone());
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let _sub = m.subscribe(move |_: Change| h.set(h.get() + 1));

        assert_eq!(m.modify(10), 13);
        bonus.set(5);
        assert_eq!(m.modify(10), 15);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn with_input_custom_transform() {
        let percent = Observable::new(25.0_f64);
        let m = Modifier::with_input(percent.clone(), "+pct", |p: f64, x: f64| {
            x * (1.0 + p / 100.0)
        });
        assert!((m.modify(100.0) - 125.0).abs() < 1e-9);
    }
}
