//! Row descriptors: where a row's slots live.

/// Location and size of one row within a [`SegmentList`](crate::segment::SegmentList).
///
/// A row with zero capacity owns no storage; its `segment_index` and
/// `offset` are meaningless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowDescriptor {
    /// Segment holding the row's slots.
    pub segment_index: u16,
    /// First slot of the row within the segment.
    pub offset: u32,
    /// Number of live slots.
    pub len: u32,
    /// Number of reserved slots (`len <= capacity`).
    pub capacity: u32,
}

impl RowDescriptor {
    /// A row with no storage.
    pub const EMPTY: Self = Self {
        segment_index: 0,
        offset: 0,
        len: 0,
        capacity: 0,
    };

    /// Whether the row holds no live slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the row owns a storage range.
    pub fn has_storage(&self) -> bool {
        self.capacity > 0
    }
}
