//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a container's row storage.
///
/// Controls segment sizing and the limits past which allocation fails.
/// Validated when a [`RowStore`](crate::RowStore) is created; immutable after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Largest regular segment, in pointer-sized slots.
    ///
    /// Regular segments start at
    /// [`INITIAL_SEGMENT_SLOTS`](crate::segment::INITIAL_SEGMENT_SLOTS) and
    /// double until they reach this size. Default: 65_536 (512KB on 64-bit
    /// targets). Must be at least
    /// [`MIN_SEGMENT_SLOTS`](Self::MIN_SEGMENT_SLOTS). Rows larger than this
    /// get a dedicated segment of their own.
    pub segment_slots: u32,

    /// Maximum number of segments, regular and dedicated combined.
    ///
    /// Default: 4096.
    pub max_segments: u16,

    /// Maximum number of rows in the outer sequence.
    ///
    /// Default: `u32::MAX`.
    pub max_rows: u32,
}

impl ArenaConfig {
    /// Default segment size in slots.
    pub const DEFAULT_SEGMENT_SLOTS: u32 = 65_536;

    /// Default maximum segment count.
    pub const DEFAULT_MAX_SEGMENTS: u16 = 4096;

    /// Default outer length limit.
    pub const DEFAULT_MAX_ROWS: u32 = u32::MAX;

    /// Smallest accepted segment size.
    pub const MIN_SEGMENT_SLOTS: u32 = 64;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            segment_slots: Self::DEFAULT_SEGMENT_SLOTS,
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
            max_rows: Self::DEFAULT_MAX_ROWS,
        }
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.segment_slots < Self::MIN_SEGMENT_SLOTS {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "segment_slots ({}) must be at least {}",
                    self.segment_slots,
                    Self::MIN_SEGMENT_SLOTS
                ),
            });
        }
        if self.max_segments == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_segments must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Size of the largest regular segment in bytes.
    pub fn segment_bytes(&self) -> usize {
        self.segment_slots as usize * std::mem::size_of::<usize>()
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
