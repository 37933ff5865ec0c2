#![forbid(unsafe_code)]

//! Modifiers and the ordered chains that hold them.
//!
//! A [`Modifier`] is a named transform with a priority, an enabled flag and
//! a set of [`RemovableBy`] tags. A [`ModifierSet`] keeps modifiers in
//! `(priority, insertion)` order and folds the enabled ones over an input.

mod set;
mod transform;

pub use set::{ModifierKey, ModifierSet};
pub use transform::{Modifier, RemovableBy};
