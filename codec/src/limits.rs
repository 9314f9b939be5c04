//! Capacity limits for sync message encoding.

use world::MAX_LOCAL_MOBS;

/// Per-observer capacity limits.
///
/// Both values are clamped to [`MAX_LOCAL_MOBS`] when applied, since the
/// client counts local entries in 8 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum number of mobs of one kind an observer tracks.
    pub max_local_mobs: usize,
    /// Maximum number of mobs added to a local view set per tick.
    pub max_additions_per_tick: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_local_mobs: MAX_LOCAL_MOBS,
            max_additions_per_tick: 15,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_local_mobs: 32,
            max_additions_per_tick: 4,
        }
    }

    /// Creates limits bounded only by the protocol.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_local_mobs: usize::MAX,
            max_additions_per_tick: usize::MAX,
        }
    }

    /// Local set capacity after clamping.
    #[must_use]
    pub fn local_capacity(&self) -> usize {
        self.max_local_mobs.min(MAX_LOCAL_MOBS)
    }

    /// Per-tick admission capacity after clamping.
    #[must_use]
    pub fn admission_capacity(&self) -> usize {
        self.max_additions_per_tick.min(MAX_LOCAL_MOBS)
    }
}
