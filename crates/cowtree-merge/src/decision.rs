//! The read-modify-write contract between a map and its callers.
//!
//! A map update reads the value currently stored under a key, asks a
//! [`DecisionMaker`] what to do with it, and installs the result only if no
//! other writer changed the map in between. When a writer loses that race
//! the map calls [`DecisionMaker::reset`] and asks again against the newer
//! value, so `decide` and `select_value` must be free of side effects other
//! than state that `reset` clears.

use std::cell::RefCell;

/// What a map update should do with the entry it is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Leave the map unchanged.
    Abort,
    /// Delete the entry.
    Remove,
    /// Store the value returned by [`DecisionMaker::select_value`].
    Put,
    /// Discard this attempt and start over immediately.
    Repeat,
}

/// Decides how a map update proceeds for one key.
///
/// `existing` is the value currently stored under the key and `provided` is
/// the caller's input value; either may be absent.
pub trait DecisionMaker<V: Clone> {
    fn decide(&self, existing: Option<&V>, provided: Option<&V>) -> Decision;

    /// The value to store. Only called after `decide` returned
    /// [`Decision::Put`]. Returning `None` turns the update into a removal.
    fn select_value(&self, _existing: Option<&V>, provided: Option<&V>) -> Option<V> {
        provided.cloned()
    }

    /// Clear any state left by an attempt that is about to be retried.
    fn reset(&self) {}

    /// Bind a provided value, turning this maker into a [`Merge`].
    fn with_provided(self, provided: Option<V>) -> WithProvided<Self, V>
    where
        Self: Sized,
    {
        WithProvided::new(self, provided)
    }
}

impl<V: Clone, D: DecisionMaker<V> + ?Sized> DecisionMaker<V> for &D {
    fn decide(&self, existing: Option<&V>, provided: Option<&V>) -> Decision {
        (**self).decide(existing, provided)
    }

    fn select_value(&self, existing: Option<&V>, provided: Option<&V>) -> Option<V> {
        (**self).select_value(existing, provided)
    }

    fn reset(&self) {
        (**self).reset()
    }
}

/// Result of a [`Merge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome<V> {
    Abort,
    Put(V),
    Remove,
}

impl<V> MergeOutcome<V> {
    /// Returns `true` if the merge leaves the map unchanged.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort)
    }
}

/// A pure read-modify-write step: given the current value, produce the
/// outcome. The map re-runs it against the latest value on every retry.
pub trait Merge<V> {
    fn merge(&self, existing: Option<&V>) -> MergeOutcome<V>;
}

/// A [`DecisionMaker`] paired with a fixed provided value.
///
/// A maker that keeps answering [`Decision::Repeat`] makes `merge` spin.
#[derive(Clone, Debug)]
pub struct WithProvided<D, V> {
    maker: D,
    provided: Option<V>,
}

impl<D, V> WithProvided<D, V> {
    pub fn new(maker: D, provided: Option<V>) -> Self {
        Self { maker, provided }
    }

    pub fn maker(&self) -> &D {
        &self.maker
    }

    pub fn provided(&self) -> Option<&V> {
        self.provided.as_ref()
    }
}

impl<V: Clone, D: DecisionMaker<V>> Merge<V> for WithProvided<D, V> {
    fn merge(&self, existing: Option<&V>) -> MergeOutcome<V> {
        let provided = self.provided.as_ref();
        loop {
            match self.maker.decide(existing, provided) {
                Decision::Repeat => self.maker.reset(),
                Decision::Abort => return MergeOutcome::Abort,
                Decision::Remove => return MergeOutcome::Remove,
                Decision::Put => {
                    return match self.maker.select_value(existing, provided) {
                        Some(value) => MergeOutcome::Put(value),
                        None => MergeOutcome::Remove,
                    }
                }
            }
        }
    }
}

/// Drives a [`Merge`] through the map's decision-maker loop. The outcome
/// computed in `decide` is parked until `select_value` collects it.
pub(crate) struct MergeDecision<'a, M: ?Sized, V> {
    merge: &'a M,
    pending: RefCell<Option<V>>,
}

impl<'a, M: ?Sized, V> MergeDecision<'a, M, V> {
    pub(crate) fn new(merge: &'a M) -> Self {
        Self {
            merge,
            pending: RefCell::new(None),
        }
    }
}

impl<M: Merge<V> + ?Sized, V: Clone> DecisionMaker<V> for MergeDecision<'_, M, V> {
    fn decide(&self, existing: Option<&V>, _provided: Option<&V>) -> Decision {
        match self.merge.merge(existing) {
            MergeOutcome::Abort => Decision::Abort,
            MergeOutcome::Remove => Decision::Remove,
            MergeOutcome::Put(value) => {
                *self.pending.borrow_mut() = Some(value);
                Decision::Put
            }
        }
    }

    fn select_value(&self, _existing: Option<&V>, _provided: Option<&V>) -> Option<V> {
        self.pending.borrow_mut().take()
    }

    fn reset(&self) {
        self.pending.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Answers `Repeat` until reset twice, then puts.
    struct Stubborn {
        resets: Cell<u32>,
    }

    impl DecisionMaker<i64> for Stubborn {
        fn decide(&self, _existing: Option<&i64>, _provided: Option<&i64>) -> Decision {
            if self.resets.get() < 2 {
                Decision::Repeat
            } else {
                Decision::Put
            }
        }

        fn reset(&self) {
            self.resets.set(self.resets.get() + 1);
        }
    }

    struct Doubler;

    impl Merge<i64> for Doubler {
        fn merge(&self, existing: Option<&i64>) -> MergeOutcome<i64> {
            match existing {
                Some(v) => MergeOutcome::Put(v * 2),
                None => MergeOutcome::Abort,
            }
        }
    }

    #[test]
    fn repeat_resets_before_deciding_again() {
        let merge = Stubborn {
            resets: Cell::new(0),
        }
        .with_provided(Some(7));
        assert_eq!(merge.merge(None), MergeOutcome::Put(7));
        assert_eq!(merge.maker().resets.get(), 2);
    }

    #[test]
    fn put_without_value_becomes_remove() {
        struct Empty;
        impl DecisionMaker<i64> for Empty {
            fn decide(&self, _: Option<&i64>, _: Option<&i64>) -> Decision {
                Decision::Put
            }
        }
        assert_eq!(Empty.with_provided(None).merge(Some(&1)), MergeOutcome::Remove);
    }

    #[test]
    fn merge_decision_hands_over_value() {
        let maker = MergeDecision::new(&Doubler);
        assert_eq!(maker.decide(Some(&21), None), Decision::Put);
        assert_eq!(maker.select_value(Some(&21), None), Some(42));
        assert_eq!(maker.select_value(Some(&21), None), None);

        assert_eq!(maker.decide(None, None), Decision::Abort);
    }

    #[test]
    fn merge_decision_reset_drops_pending_value() {
        let maker = MergeDecision::new(&Doubler);
        maker.decide(Some(&1), None);
        maker.reset();
        assert_eq!(maker.select_value(Some(&1), None), None);
    }

    #[test]
    fn abort_outcome() {
        assert!(MergeOutcome::<i64>::Abort.is_abort());
        assert!(!MergeOutcome::Put(1).is_abort());
    }
}
