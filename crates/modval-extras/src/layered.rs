#![forbid(unsafe_code)]

//! Four-layer composite stat.
//!
//! The stat is one [`ModifiableValue`] whose chain holds four input-driven
//! modifiers, one per layer, at fixed ascending priorities:
//!
//! ```text
//! ((base + raw_plus) * raw_multiply + final_plus) * final_multiply
//! ```
//!
//! Each layer is a [`ModifiableValue`] of its own. Adding a modifier to a
//! layer changes that layer's value, which the stat's layer modifier relays,
//! so observers of the stat hear about it without extra wiring.
//!
//! Other modifiers can be slotted between layers by choosing a priority
//! between the [`layer`] constants.

use std::fmt;
use std::rc::Rc;

use modval_core::{Change, ModifiableValue, Modifier, Numeric, Readable, Subscription};
use num_traits::{One, Zero};

/// Priorities of the four layer modifiers in the stat's chain.
pub mod layer {
    pub const RAW_PLUS: i32 = 10;
    pub const RAW_MULTIPLY: i32 = 20;
    pub const FINAL_PLUS: i32 = 30;
    pub const FINAL_MULTIPLY: i32 = 40;
}

/// A stat with raw and final, additive and multiplicative bonus layers.
///
/// Cloning creates a new handle to the **same** stat and layers.
pub struct LayeredStat<T> {
    stat: ModifiableValue<T>,
    raw_plus: ModifiableValue<T>,
    raw_multiply: ModifiableValue<T>,
    final_plus: ModifiableValue<T>,
    final_multiply: ModifiableValue<T>,
}

impl<T> Clone for LayeredStat<T> {
    fn clone(&self) -> Self {
        Self {
            stat: self.stat.clone(),
            raw_plus: self.raw_plus.clone(),
            raw_multiply: self.raw_multiply.clone(),
            final_plus: self.final_plus.clone(),
            final_multiply: self.final_multiply.clone(),
        }
    }
}

impl<T: Numeric> Default for LayeredStat<T> {
    fn default() -> Self {
        Self::new(T::zero())
    }
}

impl<T: Numeric> LayeredStat<T> {
    /// A stat over `base`. Additive layers start at zero, multiplicative
    /// layers at one, so a fresh stat reads as its base.
    pub fn new(base: T) -> Self {
        let stat = ModifiableValue::new(base);
        let raw_plus = ModifiableValue::new(T::zero());
        let raw_multiply = ModifiableValue::new(T::one());
        let final_plus = ModifiableValue::new(T::zero());
        let final_multiply = ModifiableValue::new(T::one());

        let chain = stat.modifiers();
        chain.add_at(
            layer::RAW_PLUS,
            Modifier::plus_source(raw_plus.clone()).with_name("raw+"),
        );
        chain.add_at(
            layer::RAW_MULTIPLY,
            Modifier::multiply_source(raw_multiply.clone()).with_name("raw*"),
        );
        chain.add_at(
            layer::FINAL_PLUS,
            Modifier::plus_source(final_plus.clone()).with_name("final+"),
        );
        chain.add_at(
            layer::FINAL_MULTIPLY,
            Modifier::multiply_source(final_multiply.clone()).with_name("final*"),
        );

        Self {
            stat,
            raw_plus,
            raw_multiply,
            final_plus,
            final_multiply,
        }
    }

    #[must_use]
    pub fn base_value(&self) -> T {
        self.stat.base_value()
    }

    pub fn set_base_value(&self, value: T) {
        self.stat.set_base_value(value);
    }

    /// The underlying modifiable value, for modifiers outside the layers.
    #[must_use]
    pub fn stat(&self) -> &ModifiableValue<T> {
        &self.stat
    }

    /// Flat bonuses applied to the base.
    #[must_use]
    pub fn raw_plus(&self) -> &ModifiableValue<T> {
        &self.raw_plus
    }

    /// Factor applied after the raw flat bonuses.
    #[must_use]
    pub fn raw_multiply(&self) -> &ModifiableValue<T> {
        &self.raw_multiply
    }

    /// Flat bonuses applied after the raw layers.
    #[must_use]
    pub fn final_plus(&self) -> &ModifiableValue<T> {
        &self.final_plus
    }

    /// Factor applied last.
    #[must_use]
    pub fn final_multiply(&self) -> &ModifiableValue<T> {
        &self.final_multiply
    }

    /// Render the stat's chain in the [`ModifiableValue::describe`] format,
    /// e.g. `"base" 10 raw+ raw* -3 final+ final* -> 9`.
    ///
    /// Layers appear by name; their current values are in the `Debug`
    /// output. Modifiers slotted between layers are listed where they run.
    #[must_use]
    pub fn describe(&self) -> String {
        self.stat.describe()
    }
}

impl<T: Numeric> Readable<T> for LayeredStat<T> {
    fn value(&self) -> T {
        self.stat.value()
    }

    fn subscribe_with(&self, callback: Rc<dyn Fn(Change)>) -> Subscription {
        self.stat.subscribe_with(callback)
    }
}

impl<T: Numeric> fmt::Display for LayeredStat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

impl<T: Numeric> fmt::Debug for LayeredStat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredStat")
            .field("base", &self.base_value())
            .field("raw_plus", &self.raw_plus.value())
            .field("raw_multiply", &self.raw_multiply.value())
            .field("final_plus", &self.final_plus.value())
            .field("final_multiply", &self.final_multiply.value())
            .field("value", &self.value())
            .finish()
    }
}
