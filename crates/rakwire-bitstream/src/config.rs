//! Stream configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GrowthPolicy
// ---------------------------------------------------------------------------

/// How the backing allocation grows when a write runs past it.
///
/// The logical capacity reported by
/// [`BitStream::capacity`](crate::BitStream::capacity) is exact under both
/// policies. Only the size of the underlying allocation differs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Reserve exactly the bytes the write needs.
    Exact,

    /// Let the allocation over-reserve (doubling), so a packet built
    /// field by field reallocates O(log n) times.
    #[default]
    Amortized,
}

// ---------------------------------------------------------------------------
// StreamConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`BitStream`](crate::BitStream).
///
/// Missing fields fall back to [`StreamConfig::default`] when loaded
/// through serde, so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes reserved up front. This is an allocation hint and does not
    /// change the logical capacity of an empty stream.
    pub initial_capacity: usize,

    /// Allocation strategy on growth.
    pub growth: GrowthPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            // Fits a typical game-state datagram without reallocating.
            initial_capacity: 256,
            growth: GrowthPolicy::Amortized,
        }
    }
}
