#![forbid(unsafe_code)]

//! Usage patterns layered on the core primitives.
//!
//! - [`LayeredStat`]: a stat folded through four bonus layers (raw plus, raw
//!   multiply, final plus, final multiply), each a modifiable value itself.
//! - [`TagRemoval`]: strip modifiers from a chain by their
//!   [`RemovableBy`](modval_core::RemovableBy) tags.

pub mod layered;
pub mod removal;

pub use layered::{LayeredStat, layer};
pub use removal::TagRemoval;
