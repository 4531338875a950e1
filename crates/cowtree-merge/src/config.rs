use cowtree_codec::PageConfig;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// Configuration for a [`CowMap`](crate::CowMap).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Lock-free attempts an update makes before it holds the write lock
    /// for a whole attempt.
    pub optimistic_attempts: u32,
    /// Limits for the page frame the map is saved to and loaded from.
    pub page: PageConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            optimistic_attempts: 3,
            page: PageConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> MergeResult<Self> {
        toml::from_str(input).map_err(|e| MergeError::Config(e.to_string()))
    }

    /// A configuration that never retries without the write lock.
    pub fn pessimistic() -> Self {
        Self {
            optimistic_attempts: 0,
            ..Default::default()
        }
    }
}
