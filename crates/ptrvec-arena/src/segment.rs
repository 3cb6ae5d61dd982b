//! Contiguous slot segments and growable segment lists.
//!
//! A [`Segment`] is a contiguous `Vec<OpaquePtr>` with bump allocation.
//! A [`SegmentList`] is a growable collection of segments that overflow into
//! new segments when the current one is full. Regular segments start at
//! [`INITIAL_SEGMENT_SLOTS`] and double in size up to the configured
//! maximum, so a container holding a handful of pointers stays small.

use ptrvec_core::OpaquePtr;

use crate::error::ArenaError;

/// Size of the first regular segment in a list.
pub const INITIAL_SEGMENT_SLOTS: u32 = 64;

/// A single contiguous run of slots with bump allocation.
///
/// Segments are never freed individually; ranges inside them are retired
/// and reused by the [`RowStore`](crate::RowStore), and the whole list is
/// dropped once no row holds storage.
pub struct Segment {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<OpaquePtr>,
    /// Bump pointer: next free slot.
    cursor: usize,
}

impl Segment {
    /// Create a segment holding `capacity` null slots.
    ///
    /// Fails with [`ArenaError::OutOfMemory`] if the system allocator
    /// cannot reserve the storage.
    pub fn new(capacity: u32) -> Result<Self, ArenaError> {
        let capacity = capacity as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: capacity,
            })?;
        data.resize(capacity, OpaquePtr::NULL);
        Ok(Self { data, cursor: 0 })
    }

    /// Bump-allocate `len` slots from this segment.
    ///
    /// Returns the starting offset, or `None` if the segment lacks room.
    pub fn alloc(&mut self, len: u32) -> Option<u32> {
        let new_cursor = self.cursor.checked_add(len as usize)?;
        if new_cursor > self.data.len() {
            return None;
        }
        let offset = self.cursor as u32;
        self.cursor = new_cursor;
        Some(offset)
    }

    /// Get a shared slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice(&self, offset: u32, len: u32) -> &[OpaquePtr] {
        let start = offset as usize;
        &self.data[start..start + len as usize]
    }

    /// Get a mutable slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice_mut(&mut self, offset: u32, len: u32) -> &mut [OpaquePtr] {
        let start = offset as usize;
        &mut self.data[start..start + len as usize]
    }

    /// Number of slots handed out by the bump pointer.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in slots.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Slots not yet handed out.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<OpaquePtr>()
    }
}

/// A growable list of [`Segment`]s with overflow-based bump allocation.
///
/// Segments are created lazily: an empty list holds no storage. Regular
/// segments grow geometrically up to `segment_slots`; requests larger than
/// `segment_slots` get a dedicated segment sized to fit. Allocations never
/// span segments.
pub struct SegmentList {
    segments: Vec<Segment>,
    segment_slots: u32,
    max_segments: u16,
    /// Size of the next regular segment.
    next_slots: u32,
    /// Index of the regular segment currently being filled.
    current: usize,
}

impl SegmentList {
    /// Create an empty segment list.
    pub fn new(segment_slots: u32, max_segments: u16) -> Self {
        Self {
            segments: Vec::new(),
            segment_slots,
            max_segments,
            next_slots: segment_slots.min(INITIAL_SEGMENT_SLOTS),
            current: 0,
        }
    }

    /// Bump-allocate `len` slots, growing into a new segment if needed.
    ///
    /// Returns `(segment_index, offset)`. Fails with
    /// [`ArenaError::CapacityExceeded`] if `max_segments` would be exceeded
    /// or [`ArenaError::OutOfMemory`] if a new segment cannot be reserved.
    pub fn alloc(&mut self, len: u32) -> Result<(u16, u32), ArenaError> {
        if len > self.segment_slots {
            // Dedicated segments are sized exactly, so they never have room
            // for a second request.
            let index = self.push_segment(len)?;
            let offset = self.segments[index]
                .alloc(len)
                .ok_or(ArenaError::CapacityExceeded {
                    requested: len as usize,
                    capacity: len as usize,
                })?;
            return Ok((index as u16, offset));
        }

        // Try the current segment, then any later one with room.
        for index in self.current..self.segments.len() {
            if let Some(offset) = self.segments[index].alloc(len) {
                self.current = index;
                return Ok((index as u16, offset));
            }
        }

        // len <= segment_slots here, so the new segment always fits it.
        let slots = self.next_slots.max(len).min(self.segment_slots);
        let index = self.push_segment(slots)?;
        self.next_slots = slots.saturating_mul(2).min(self.segment_slots);
        self.current = index;
        let offset = self.segments[index]
            .alloc(len)
            .ok_or(ArenaError::CapacityExceeded {
                requested: len as usize,
                capacity: slots as usize,
            })?;
        Ok((index as u16, offset))
    }

    fn push_segment(&mut self, capacity: u32) -> Result<usize, ArenaError> {
        if self.segments.len() >= self.max_segments as usize {
            return Err(ArenaError::CapacityExceeded {
                requested: self.segments.len() + 1,
                capacity: self.max_segments as usize,
            });
        }
        self.segments
            .try_reserve(1)
            .map_err(|_| ArenaError::OutOfMemory { requested: 1 })?;
        self.segments.push(Segment::new(capacity)?);
        Ok(self.segments.len() - 1)
    }

    /// Get a shared slice from the given segment.
    pub fn slice(&self, segment_index: u16, offset: u32, len: u32) -> &[OpaquePtr] {
        self.segments[segment_index as usize].slice(offset, len)
    }

    /// Get a mutable slice from the given segment.
    pub fn slice_mut(&mut self, segment_index: u16, offset: u32, len: u32) -> &mut [OpaquePtr] {
        self.segments[segment_index as usize].slice_mut(offset, len)
    }

    /// Copy `len` slots between two ranges, which may live in different
    /// segments. The ranges must not overlap.
    pub fn copy_range(&mut self, src: (u16, u32), dst: (u16, u32), len: u32) {
        let (src_seg, src_off) = (src.0 as usize, src.1 as usize);
        let (dst_seg, dst_off) = (dst.0 as usize, dst.1 as usize);
        let len = len as usize;
        if src_seg == dst_seg {
            self.segments[src_seg]
                .data
                .copy_within(src_off..src_off + len, dst_off);
            return;
        }
        let (from, to) = if src_seg < dst_seg {
            let (lo, hi) = self.segments.split_at_mut(dst_seg);
            (&lo[src_seg], &mut hi[0])
        } else {
            let (lo, hi) = self.segments.split_at_mut(src_seg);
            (&hi[0], &mut lo[dst_seg])
        };
        to.data[dst_off..dst_off + len].copy_from_slice(&from.data[src_off..src_off + len]);
    }

    /// Number of segments currently allocated.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total memory usage across all segments in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.memory_bytes()).sum()
    }

    /// Total slot capacity across all segments.
    pub fn capacity_slots(&self) -> usize {
        self.segments.iter().map(|s| s.capacity()).sum()
    }
}
