use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use crate::persistent_set::PersistentSet;

/// Read view over a set value, whatever its in-memory representation.
///
/// Set values reach the merge layer either as a [`PersistentSet`] (produced
/// by an earlier merge) or as a plain std set (freshly built by a caller or
/// decoded by a codec that does not produce persistent sets).
pub trait SetLike<T> {
    fn contains_member(&self, value: &T) -> bool;

    fn member_count(&self) -> usize;

    fn has_no_members(&self) -> bool {
        self.member_count() == 0
    }

    /// The same members as a [`PersistentSet`].
    ///
    /// Persistent sets return a structure-sharing clone; plain sets are
    /// copied into a fresh persistent set.
    fn to_persistent(&self) -> PersistentSet<T>;
}

impl<T: Ord + Clone> SetLike<T> for PersistentSet<T> {
    fn contains_member(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn to_persistent(&self) -> PersistentSet<T> {
        self.clone()
    }
}

impl<T: Ord + Clone> SetLike<T> for BTreeSet<T> {
    fn contains_member(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn to_persistent(&self) -> PersistentSet<T> {
        self.iter().cloned().collect()
    }
}

impl<T: Ord + Clone + Hash> SetLike<T> for HashSet<T> {
    fn contains_member(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn to_persistent(&self) -> PersistentSet<T> {
        self.iter().cloned().collect()
    }
}
