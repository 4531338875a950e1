//! Value objects for the cowtree codec framework.
//!
//! Every other cowtree crate depends on `cowtree-types`. The types here are
//! immutable once constructed: codecs create them fresh on every decode and
//! never mutate them afterwards.
//!
//! # Key Types
//!
//! - [`Uint128`]: 128-bit hash key, two unsigned 64-bit halves
//! - [`IntLongPair`]: composite `(i32, i64)` key
//! - [`PersistentSet`]: immutable ordered set with structure-sharing updates
//! - [`SetLike`]: read view over persistent and plain set representations

pub mod error;
pub mod pair;
pub mod persistent_set;
pub mod set_like;
pub mod uint128;

pub use error::TypeError;
pub use pair::IntLongPair;
pub use persistent_set::{Iter, PersistentSet};
pub use set_like::SetLike;
pub use uint128::Uint128;
