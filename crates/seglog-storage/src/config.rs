//! Engine configuration.
//!
//! Segment limits control when the log rolls to a new segment: the store
//! side caps raw record bytes, the index side caps entry count (12 bytes per
//! entry). `initial_offset` sets the base offset of the segment seeded into
//! an empty log.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Roll when appending would push the store at or past this size.
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Roll when the index has no room for another 12-byte entry. Also the
    /// size the index file is pre-grown to before memory-mapping.
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// Base offset of the segment seeded into an empty log.
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}
