//! The native object behind a container address.
//!
//! [`RowStore`] implements the logical value "sequence of sequences of
//! opaque pointers" on top of a [`SegmentList`]. All index arguments are
//! bounds-checked and reported as [`ArenaError`]s; nothing here panics on
//! caller input.

use indexmap::IndexMap;
use ptrvec_core::{ContainerStats, OpaquePtr};
use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::descriptor::RowDescriptor;
use crate::error::ArenaError;
use crate::segment::SegmentList;

/// Smallest capacity a row with storage is given.
pub const MIN_ROW_CAPACITY: u32 = 4;

/// Round a requested row length up to its capacity class.
fn capacity_class(len: u32) -> u32 {
    if len <= MIN_ROW_CAPACITY {
        MIN_ROW_CAPACITY
    } else {
        len.checked_next_power_of_two().unwrap_or(len)
    }
}

/// A slot range given up by a row, available for reuse.
#[derive(Clone, Copy, Debug)]
struct RetiredRange {
    segment_index: u16,
    offset: u32,
}

/// Row storage for one native container.
pub struct RowStore {
    config: ArenaConfig,
    rows: Vec<RowDescriptor>,
    segments: SegmentList,
    /// Freed ranges keyed by capacity class. Reuse is exact-class, so a
    /// range is always handed back out at the size it was allocated with.
    retired: IndexMap<u32, SmallVec<[RetiredRange; 4]>>,
    /// Rows currently holding a storage range.
    stored_rows: usize,
}

impl RowStore {
    /// Create an empty store.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let segments = SegmentList::new(config.segment_slots, config.max_segments);
        Ok(Self {
            config,
            rows: Vec::new(),
            segments,
            retired: IndexMap::new(),
            stored_rows: 0,
        })
    }

    /// Create a store holding `rows` empty rows.
    pub fn with_rows(config: ArenaConfig, rows: usize) -> Result<Self, ArenaError> {
        let mut store = Self::new(config)?;
        store.resize(rows)?;
        Ok(store)
    }

    /// The configuration this store was created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the outer sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Grow or shrink the outer sequence to exactly `rows` rows.
    ///
    /// New rows are empty. Truncated rows give their ranges back to the
    /// retired pool; the pointer values they held are simply forgotten.
    /// Once no remaining row holds storage, every segment is freed.
    pub fn resize(&mut self, rows: usize) -> Result<(), ArenaError> {
        if rows > self.config.max_rows as usize {
            return Err(ArenaError::CapacityExceeded {
                requested: rows,
                capacity: self.config.max_rows as usize,
            });
        }
        if rows <= self.rows.len() {
            for desc in self.rows.drain(rows..) {
                if desc.has_storage() {
                    self.stored_rows -= 1;
                }
                Self::retire(&mut self.retired, desc);
            }
            if self.stored_rows == 0 {
                self.release_segments();
            }
            return Ok(());
        }
        let extra = rows - self.rows.len();
        self.rows
            .try_reserve(extra)
            .map_err(|_| ArenaError::OutOfMemory { requested: extra })?;
        self.rows.resize(rows, RowDescriptor::EMPTY);
        Ok(())
    }

    /// The descriptor for row `row`.
    pub fn descriptor(&self, row: usize) -> Result<&RowDescriptor, ArenaError> {
        self.rows.get(row).ok_or(ArenaError::RowOutOfBounds {
            row,
            rows: self.rows.len(),
        })
    }

    /// Length of row `row`.
    pub fn row_len(&self, row: usize) -> Result<usize, ArenaError> {
        Ok(self.descriptor(row)?.len as usize)
    }

    /// The live slots of row `row`.
    pub fn row(&self, row: usize) -> Result<&[OpaquePtr], ArenaError> {
        let desc = *self.descriptor(row)?;
        Ok(self.slots(&desc))
    }

    fn slots(&self, desc: &RowDescriptor) -> &[OpaquePtr] {
        if desc.is_empty() {
            return &[];
        }
        self.segments
            .slice(desc.segment_index, desc.offset, desc.len)
    }

    /// Grow or shrink row `row` to exactly `len` slots.
    ///
    /// New slots are null. A row that outgrows its capacity moves to a new
    /// range; its previous range is retired.
    pub fn resize_row(&mut self, row: usize, len: usize) -> Result<(), ArenaError> {
        let desc = *self.descriptor(row)?;
        let len = u32::try_from(len).map_err(|_| ArenaError::CapacityExceeded {
            requested: len,
            capacity: u32::MAX as usize,
        })?;

        if len <= desc.capacity {
            if len > desc.len {
                self.segments
                    .slice_mut(desc.segment_index, desc.offset + desc.len, len - desc.len)
                    .fill(OpaquePtr::NULL);
            }
            self.rows[row].len = len;
            return Ok(());
        }

        let capacity = capacity_class(len);
        let (segment_index, offset) = self.reserve(capacity)?;
        if !desc.has_storage() {
            self.stored_rows += 1;
        }
        if !desc.is_empty() {
            self.segments.copy_range(
                (desc.segment_index, desc.offset),
                (segment_index, offset),
                desc.len,
            );
        }
        Self::retire(&mut self.retired, desc);
        self.rows[row] = RowDescriptor {
            segment_index,
            offset,
            len,
            capacity,
        };
        Ok(())
    }

    /// Read the value at (`row`, `column`).
    pub fn get(&self, row: usize, column: usize) -> Result<OpaquePtr, ArenaError> {
        let slots = self.row(row)?;
        slots
            .get(column)
            .copied()
            .ok_or(ArenaError::ColumnOutOfBounds {
                row,
                column,
                len: slots.len(),
            })
    }

    /// Overwrite the value at (`row`, `column`). The old value is not
    /// released.
    pub fn set(&mut self, row: usize, column: usize, value: OpaquePtr) -> Result<(), ArenaError> {
        let desc = *self.descriptor(row)?;
        if column >= desc.len as usize {
            return Err(ArenaError::ColumnOutOfBounds {
                row,
                column,
                len: desc.len as usize,
            });
        }
        self.segments
            .slice_mut(desc.segment_index, desc.offset + column as u32, 1)[0] = value;
        Ok(())
    }

    /// Replace row `row` with `values`.
    pub fn write_row(&mut self, row: usize, values: &[OpaquePtr]) -> Result<(), ArenaError> {
        self.resize_row(row, values.len())?;
        if values.is_empty() {
            return Ok(());
        }
        let desc = self.rows[row];
        self.segments
            .slice_mut(desc.segment_index, desc.offset, desc.len)
            .copy_from_slice(values);
        Ok(())
    }

    /// Replace this store's contents with a copy of `other`'s.
    ///
    /// Row structure and pointer values are copied; this store keeps its own
    /// configuration. The copy is built in fresh, compact storage and only
    /// replaces this store's contents once it is complete, so on error this
    /// store is unchanged.
    pub fn assign_from(&mut self, other: &RowStore) -> Result<(), ArenaError> {
        let mut copy = RowStore::with_rows(self.config.clone(), other.len())?;
        for (row, desc) in other.rows.iter().enumerate() {
            if !desc.is_empty() {
                copy.write_row(row, other.slots(desc))?;
            }
        }
        *self = copy;
        Ok(())
    }

    /// Copy the whole container out as nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<OpaquePtr>> {
        self.rows.iter().map(|d| self.slots(d).to_vec()).collect()
    }

    /// Storage statistics.
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            rows: self.rows.len(),
            slots_used: self.rows.iter().map(|d| d.len as usize).sum(),
            slots_reserved: self.rows.iter().map(|d| d.capacity as usize).sum(),
            segments: self.segments.segment_count(),
            memory_bytes: self.segments.memory_bytes()
                + self.rows.capacity() * std::mem::size_of::<RowDescriptor>(),
        }
    }

    /// Number of retired ranges waiting for reuse.
    pub fn retired_count(&self) -> usize {
        self.retired.values().map(|v| v.len()).sum()
    }

    /// Obtain a null-filled range of exactly `capacity` slots.
    fn reserve(&mut self, capacity: u32) -> Result<(u16, u32), ArenaError> {
        let reused = self
            .retired
            .get_mut(&capacity)
            .and_then(|ranges| ranges.pop());
        let (segment_index, offset) = match reused {
            Some(r) => (r.segment_index, r.offset),
            None => self.segments.alloc(capacity)?,
        };
        self.segments
            .slice_mut(segment_index, offset, capacity)
            .fill(OpaquePtr::NULL);
        Ok((segment_index, offset))
    }

    /// Free every segment and forget the retired pool. Only valid when no
    /// row holds storage.
    fn release_segments(&mut self) {
        self.segments = SegmentList::new(self.config.segment_slots, self.config.max_segments);
        self.retired.clear();
    }

    fn retire(retired: &mut IndexMap<u32, SmallVec<[RetiredRange; 4]>>, desc: RowDescriptor) {
        if !desc.has_storage() {
            return;
        }
        retired.entry(desc.capacity).or_default().push(RetiredRange {
            segment_index: desc.segment_index,
            offset: desc.offset,
        });
    }
}
