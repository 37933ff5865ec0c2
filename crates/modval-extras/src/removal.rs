#![forbid(unsafe_code)]

//! Bulk removal of modifiers by [`RemovableBy`] tag.

use modval_core::{ModifiableValue, ModifierSet, Readable, RemovableBy};

/// Strip tagged modifiers from a chain.
///
/// Each method removes every entry whose tags intersect the requested ones
/// and returns how many entries went. The chain notifies once per call that
/// removed anything.
pub trait TagRemoval {
    fn strip(&self, tags: RemovableBy) -> usize;

    /// Remove everything a cure clears.
    fn cure(&self) -> usize {
        self.strip(RemovableBy::CURE)
    }

    fn dispel(&self) -> usize {
        self.strip(RemovableBy::DISPEL)
    }

    fn unequip(&self) -> usize {
        self.strip(RemovableBy::UNEQUIP)
    }

    fn expire(&self) -> usize {
        self.strip(RemovableBy::EXPIRE)
    }
}

impl<T> TagRemoval for ModifierSet<T> {
    fn strip(&self, tags: RemovableBy) -> usize {
        let removed = self.remove_where(|modifier| modifier.removable_by().intersects(tags));
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "modifiers.strip", tags = ?tags, removed);
        removed
    }
}

impl<T, B: Readable<T>> TagRemoval for ModifiableValue<T, B> {
    fn strip(&self, tags: RemovableBy) -> usize {
        self.modifiers().strip(tags)
    }
}
