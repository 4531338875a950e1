//! Standard decision makers behind the map's convenience operations.

use std::cell::Cell;
use std::fmt;

use crate::decision::{Decision, DecisionMaker};

/// Always stores the provided value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PutAlways;

impl<V: Clone> DecisionMaker<V> for PutAlways {
    fn decide(&self, _existing: Option<&V>, _provided: Option<&V>) -> Decision {
        Decision::Put
    }
}

/// Always deletes the entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemoveAlways;

impl<V: Clone> DecisionMaker<V> for RemoveAlways {
    fn decide(&self, _existing: Option<&V>, _provided: Option<&V>) -> Decision {
        Decision::Remove
    }
}

/// Stores the provided value, or deletes the entry when none is provided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PutOrRemove;

impl<V: Clone> DecisionMaker<V> for PutOrRemove {
    fn decide(&self, _existing: Option<&V>, provided: Option<&V>) -> Decision {
        if provided.is_some() {
            Decision::Put
        } else {
            Decision::Remove
        }
    }
}

/// Stores the provided value only when the key has no entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfAbsent;

impl<V: Clone> DecisionMaker<V> for IfAbsent {
    fn decide(&self, existing: Option<&V>, _provided: Option<&V>) -> Decision {
        if existing.is_none() {
            Decision::Put
        } else {
            Decision::Abort
        }
    }
}

/// Stores the provided value only when the key already has an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfPresent;

impl<V: Clone> DecisionMaker<V> for IfPresent {
    fn decide(&self, existing: Option<&V>, _provided: Option<&V>) -> Decision {
        if existing.is_some() {
            Decision::Put
        } else {
            Decision::Abort
        }
    }
}

/// Compare-and-set: proceeds only when the stored value equals `expected`
/// (absence matches `None`). A missing provided value removes the entry.
///
/// The last decision is kept until [`reset`](DecisionMaker::reset) so the
/// caller can tell whether the swap happened.
pub struct EqualsTo<V> {
    expected: Option<V>,
    decision: Cell<Option<Decision>>,
}

impl<V> EqualsTo<V> {
    pub fn new(expected: Option<V>) -> Self {
        Self {
            expected,
            decision: Cell::new(None),
        }
    }

    pub fn expected(&self) -> Option<&V> {
        self.expected.as_ref()
    }

    /// The decision of the most recent attempt, if any.
    pub fn decision(&self) -> Option<Decision> {
        self.decision.get()
    }

    /// Returns `true` if the most recent attempt changed the map.
    pub fn succeeded(&self) -> bool {
        matches!(self.decision.get(), Some(Decision::Put | Decision::Remove))
    }
}

impl<V: fmt::Debug> fmt::Debug for EqualsTo<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualsTo")
            .field("expected", &self.expected)
            .field("decision", &self.decision.get())
            .finish()
    }
}

impl<V: Clone + PartialEq> DecisionMaker<V> for EqualsTo<V> {
    fn decide(&self, existing: Option<&V>, provided: Option<&V>) -> Decision {
        let decision = if existing == self.expected.as_ref() {
            if provided.is_some() {
                Decision::Put
            } else {
                Decision::Remove
            }
        } else {
            Decision::Abort
        };
        self.decision.set(Some(decision));
        decision
    }

    fn reset(&self) {
        self.decision.set(None);
    }
}
