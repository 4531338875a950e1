//! Adding members to a set stored under a key.
//!
//! Both operations write only when the stored set is missing a member, so
//! applying them again is a no-op that leaves the map version untouched.
//! The new value is built as a [`PersistentSet`]: when the stored set is
//! already persistent its structure is reused, a plain set is copied.

use cowtree_types::{PersistentSet, SetLike};

use crate::decision::{Decision, DecisionMaker, Merge, MergeOutcome};

fn needs_write<'a, T: 'a, S: SetLike<T>>(
    existing: Option<&S>,
    mut members: impl Iterator<Item = &'a T>,
) -> bool {
    match existing {
        None => true,
        Some(set) if set.has_no_members() => true,
        Some(set) => members.any(|m| !set.contains_member(m)),
    }
}

/// Adds one member to the stored set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddToSet<T> {
    value: T,
}

impl<T> AddToSet<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T, S> DecisionMaker<S> for AddToSet<T>
where
    T: Ord + Clone,
    S: SetLike<T> + From<PersistentSet<T>> + Clone,
{
    fn decide(&self, existing: Option<&S>, _provided: Option<&S>) -> Decision {
        if needs_write(existing, std::iter::once(&self.value)) {
            Decision::Put
        } else {
            Decision::Abort
        }
    }

    fn select_value(&self, existing: Option<&S>, _provided: Option<&S>) -> Option<S> {
        let base: PersistentSet<T> = match existing {
            Some(set) => set.to_persistent(),
            None => PersistentSet::new(),
        };
        Some(S::from(base.insert(self.value.clone())))
    }
}

impl<T, S> Merge<S> for AddToSet<T>
where
    T: Ord + Clone,
    S: SetLike<T> + From<PersistentSet<T>> + Clone,
{
    fn merge(&self, existing: Option<&S>) -> MergeOutcome<S> {
        merge_with(self, existing)
    }
}

/// Adds several members to the stored set in one write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddAllToSet<T> {
    values: Vec<T>,
}

impl<T> AddAllToSet<T> {
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T, S> DecisionMaker<S> for AddAllToSet<T>
where
    T: Ord + Clone,
    S: SetLike<T> + From<PersistentSet<T>> + Clone,
{
    fn decide(&self, existing: Option<&S>, _provided: Option<&S>) -> Decision {
        if needs_write(existing, self.values.iter()) {
            Decision::Put
        } else {
            Decision::Abort
        }
    }

    fn select_value(&self, existing: Option<&S>, _provided: Option<&S>) -> Option<S> {
        let added: PersistentSet<T> = self.values.iter().cloned().collect();
        let merged = match existing {
            Some(set) => set.to_persistent().union(&added),
            None => added,
        };
        Some(S::from(merged))
    }
}

impl<T, S> Merge<S> for AddAllToSet<T>
where
    T: Ord + Clone,
    S: SetLike<T> + From<PersistentSet<T>> + Clone,
{
    fn merge(&self, existing: Option<&S>) -> MergeOutcome<S> {
        merge_with(self, existing)
    }
}

fn merge_with<S: Clone, D: DecisionMaker<S>>(maker: &D, existing: Option<&S>) -> MergeOutcome<S> {
    match maker.decide(existing, None) {
        Decision::Put => match maker.select_value(existing, None) {
            Some(set) => MergeOutcome::Put(set),
            None => MergeOutcome::Abort,
        },
        _ => MergeOutcome::Abort,
    }
}
