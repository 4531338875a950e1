//! Optimistic read-modify-write on top of the cowtree codecs.
//!
//! Updates are expressed as a [`DecisionMaker`] (or the pure [`Merge`]
//! form) that looks at the current value and says what to write. The map
//! re-runs it against the newest value whenever another writer got there
//! first, so no update ever needs a lock in the codec layer.
//!
//! # Key Types
//!
//! - [`Decision`], [`DecisionMaker`], [`Merge`], [`MergeOutcome`]: the contract
//! - [`AddToSet`], [`AddAllToSet`]: idempotent set growth
//! - [`PutAlways`], [`RemoveAlways`], [`IfAbsent`], [`IfPresent`], [`EqualsTo`]: standard makers
//! - [`CowMap`]: in-memory copy-on-write map that hosts the retry loop

pub mod config;
pub mod decision;
pub mod error;
pub mod makers;
pub mod map;
pub mod set_merge;

pub use config::MapConfig;
pub use decision::{Decision, DecisionMaker, Merge, MergeOutcome, WithProvided};
pub use error::{MergeError, MergeResult};
pub use makers::{EqualsTo, IfAbsent, IfPresent, PutAlways, PutOrRemove, RemoveAlways};
pub use map::CowMap;
pub use set_merge::{AddAllToSet, AddToSet};
