use cowtree_codec::CodecError;
use thiserror::Error;

/// Errors from map updates and merge operations.
///
/// An aborted decision is not an error: it surfaces as the unchanged
/// previous value.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// The page handed to the map does not hold strictly ascending keys.
    #[error("page keys out of order at index {index}")]
    UnsortedKeys { index: usize },

    #[error("invalid map config: {0}")]
    Config(String),
}

/// Convenience type alias for merge operations.
pub type MergeResult<T> = std::result::Result<T, MergeError>;
