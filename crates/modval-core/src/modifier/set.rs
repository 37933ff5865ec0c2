#![forbid(unsafe_code)]

//! Priority-ordered modifier collection.
//!
//! # Design
//!
//! Entries live in a `BTreeMap` keyed by [`ModifierKey`]: the caller's
//! priority first, then a per-collection insertion counter. Iterating the map
//! therefore yields ascending priority with ties in insertion order, and no
//! two entries ever share a key.
//!
//! A side index (identity of the modifier to its keys) answers `contains` and
//! `remove` without scanning, and owns the one subscription the collection
//! holds on each distinct modifier.
//!
//! # Invariants
//!
//! 1. Enumeration order is `(priority, insertion)` ascending.
//! 2. A modifier present in the collection, however many times, is
//!    subscribed to exactly once; removing its last entry unsubscribes.
//! 3. Every mutation that changes the entry list notifies exactly once with
//!    [`Change::Modifiers`], after all internal borrows are released.
//! 4. Enumeration works on a snapshot, so subscribers and transforms may
//!    mutate the collection while a fold is running.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use super::transform::Modifier;
use crate::logging::trace;
use crate::reactive::{Change, Notifier, Subscription};

/// Position of one entry in a [`ModifierSet`].
///
/// Ordered by priority, then by insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifierKey {
    pub priority: i32,
    pub sequence: u64,
}

struct Held {
    /// Keys of every entry for this modifier, ascending.
    keys: Vec<ModifierKey>,
    _subscription: Subscription,
}

/// An ordered, observable chain of modifiers.
pub struct ModifierSet<T> {
    entries: RefCell<BTreeMap<ModifierKey, Modifier<T>>>,
    held: RefCell<AHashMap<usize, Held>>,
    next_sequence: Cell<u64>,
    notifier: Rc<Notifier>,
}

impl<T> Default for ModifierSet<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            held: RefCell::new(AHashMap::new()),
            next_sequence: Cell::new(0),
            notifier: Rc::new(Notifier::new()),
        }
    }
}

impl<T> fmt::Debug for ModifierSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.borrow().values()).finish()
    }
}

impl<T> ModifierSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `modifier` at its own [`priority`](Modifier::priority).
    pub fn add(&self, modifier: Modifier<T>) -> ModifierKey {
        let priority = modifier.priority();
        self.add_at(priority, modifier)
    }

    /// Insert `modifier` at `priority`. Lower priorities run first; equal
    /// priorities run in insertion order.
    ///
    /// Adding a modifier that is already present creates another entry.
    pub fn add_at(&self, priority: i32, modifier: Modifier<T>) -> ModifierKey {
        let sequence = self.next_sequence.get() + 1;
        self.next_sequence.set(sequence);
        let key = ModifierKey { priority, sequence };

        match self.held.borrow_mut().entry(modifier.identity()) {
            Entry::Occupied(mut slot) => {
                let keys = &mut slot.get_mut().keys;
                keys.push(key);
                keys.sort_unstable();
            }
            Entry::Vacant(slot) => {
                let subscription = self.forward(&modifier);
                slot.insert(Held {
                    keys: vec![key],
                    _subscription: subscription,
                });
            }
        }
        trace!(message = "modifiers.add", name = %modifier, priority, sequence);
        self.entries.borrow_mut().insert(key, modifier);
        self.notifier.notify(Change::Modifiers);
        key
    }

    /// Remove the earliest entry of `modifier`. Returns false, without
    /// notifying, when it is not present.
    pub fn remove(&self, modifier: &Modifier<T>) -> bool {
        let Some(key) = self.key_of(modifier) else {
            return false;
        };
        let removed = self.take(key);
        trace!(message = "modifiers.remove", name = %modifier, priority = key.priority);
        drop(removed);
        self.notifier.notify(Change::Modifiers);
        true
    }

    /// Remove every entry. Notifies once, even when already empty.
    pub fn clear(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        let held = std::mem::take(&mut *self.held.borrow_mut());
        trace!(message = "modifiers.clear", removed = entries.len());
        drop((entries, held));
        self.notifier.notify(Change::Modifiers);
    }

    /// Remove every entry whose modifier matches `predicate`. Notifies once
    /// if anything was removed. Returns the number of entries removed.
    pub fn remove_where(&self, mut predicate: impl FnMut(&Modifier<T>) -> bool) -> usize {
        let doomed: Vec<ModifierKey> = self
            .entries()
            .into_iter()
            .filter(|(_, modifier)| predicate(modifier))
            .map(|(key, _)| key)
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        let removed: Vec<_> = doomed.iter().filter_map(|&key| self.take(key)).collect();
        trace!(message = "modifiers.remove", removed = removed.len());
        let count = removed.len();
        drop(removed);
        self.notifier.notify(Change::Modifiers);
        count
    }

    /// Keep only the entries whose modifier matches `predicate`.
    pub fn retain(&self, mut predicate: impl FnMut(&Modifier<T>) -> bool) -> usize {
        self.remove_where(|modifier| !predicate(modifier))
    }

    #[must_use]
    pub fn contains(&self, modifier: &Modifier<T>) -> bool {
        self.held.borrow().contains_key(&modifier.identity())
    }

    /// Key of the earliest entry of `modifier`.
    #[must_use]
    pub fn key_of(&self, modifier: &Modifier<T>) -> Option<ModifierKey> {
        self.held
            .borrow()
            .get(&modifier.identity())
            .and_then(|held| held.keys.first().copied())
    }

    /// Number of entries, counting repeated modifiers once per entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// The modifiers in application order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Modifier<T>> {
        self.entries.borrow().values().cloned().collect()
    }

    /// Keys and modifiers in application order.
    #[must_use]
    pub fn entries(&self) -> Vec<(ModifierKey, Modifier<T>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(key, modifier)| (*key, modifier.clone()))
            .collect()
    }

    /// Iterate a snapshot of the modifiers in application order.
    pub fn iter(&self) -> std::vec::IntoIter<Modifier<T>> {
        self.snapshot().into_iter()
    }

    /// Run `input` through every enabled modifier in order.
    pub fn apply(&self, input: T) -> T {
        self.snapshot()
            .iter()
            .filter(|modifier| modifier.is_enabled())
            .fold(input, |acc, modifier| modifier.modify(acc))
    }

    /// Register a callback for changes to the chain, including toggles and
    /// input changes of held modifiers.
    pub fn subscribe(&self, callback: impl Fn(Change) + 'static) -> Subscription {
        self.notifier.subscribe(Rc::new(callback))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Re-announce any change of `modifier` as a change of the chain.
    fn forward(&self, modifier: &Modifier<T>) -> Subscription {
        let weak = Rc::downgrade(&self.notifier);
        modifier.subscribe(move |_: Change| {
            if let Some(notifier) = weak.upgrade() {
                notifier.notify(Change::Modifiers);
            }
        })
    }

    /// Unlink the entry at `key`. The caller drops the result once no borrow
    /// is held, then notifies.
    fn take(&self, key: ModifierKey) -> Option<(Modifier<T>, Option<Held>)> {
        let modifier = self.entries.borrow_mut().remove(&key)?;
        let mut held = self.held.borrow_mut();
        let id = modifier.identity();
        let emptied = match held.get_mut(&id) {
            Some(slot) => {
                slot.keys.retain(|k| *k != key);
                slot.keys.is_empty()
            }
            None => false,
        };
        let released = if emptied { held.remove(&id) } else { None };
        Some((modifier, released))
    }
}

impl<'a, T> IntoIterator for &'a ModifierSet<T> {
    type Item = Modifier<T>;
    type IntoIter = std::vec::IntoIter<Modifier<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
