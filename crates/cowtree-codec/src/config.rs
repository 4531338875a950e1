use serde::{Deserialize, Serialize};

/// Limits applied when reading and writing page frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Maximum number of entries a single page may hold.
    pub max_entries: usize,
    /// Whether readers verify the CRC32 trailer before decoding.
    pub verify_checksum: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            max_entries: 64 * 1024,
            verify_checksum: true,
        }
    }
}
