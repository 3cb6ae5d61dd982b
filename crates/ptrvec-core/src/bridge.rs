//! The native bridge capability.
//!
//! [`NativeBridge`] is the only seam between the proxy and the native
//! container: lifecycle, sizing, element access and whole-row transfer,
//! each keyed by an [`Address`]. The production
//! implementation talks to the C ABI; tests substitute an in-memory one.

use crate::error::ContainerError;
use crate::ptr::{Address, OpaquePtr};

/// Storage statistics for one native container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// Number of rows in the outer sequence.
    pub rows: usize,
    /// Sum of all row lengths.
    pub slots_used: usize,
    /// Slots reserved by row descriptors (capacity, not length).
    pub slots_reserved: usize,
    /// Number of backing segments.
    pub segments: usize,
    /// Bytes of backing storage held by the container.
    pub memory_bytes: usize,
}

/// Operations a native nested pointer container must support.
///
/// Every method that takes indices bounds-checks them on the native side
/// and reports [`ContainerError::IndexOutOfBounds`]. Every method that
/// takes an address reports [`ContainerError::InvalidState`] when the
/// address is null or no longer names a live container.
pub trait NativeBridge {
    /// Allocate a container holding `rows` empty rows.
    fn allocate(&self, rows: usize) -> Result<Address, ContainerError>;

    /// Release a container. Must be called at most once per address.
    fn release(&self, address: Address) -> Result<(), ContainerError>;

    /// Replace the contents of `dst` with a copy of `src`.
    ///
    /// Row structure and pointer values are copied; pointees are not.
    fn assign(&self, dst: Address, src: Address) -> Result<(), ContainerError>;

    /// Number of rows.
    fn len(&self, address: Address) -> Result<usize, ContainerError>;

    /// Grow or shrink the outer sequence to exactly `rows` rows.
    fn resize(&self, address: Address, rows: usize) -> Result<(), ContainerError>;

    /// Length of row `row`.
    fn row_len(&self, address: Address, row: usize) -> Result<usize, ContainerError>;

    /// Grow or shrink row `row` to exactly `len` slots. New slots are null.
    fn resize_row(&self, address: Address, row: usize, len: usize)
        -> Result<(), ContainerError>;

    /// Read the value at (`row`, `column`).
    fn get(&self, address: Address, row: usize, column: usize)
        -> Result<OpaquePtr, ContainerError>;

    /// Overwrite the value at (`row`, `column`).
    fn put(
        &self,
        address: Address,
        row: usize,
        column: usize,
        value: OpaquePtr,
    ) -> Result<(), ContainerError>;

    /// Copy row `row` into the front of `buf`, returning the row length.
    ///
    /// Fails with [`ContainerError::BufferTooSmall`] (copying nothing) when
    /// `buf` is shorter than the row.
    fn read_row(
        &self,
        address: Address,
        row: usize,
        buf: &mut [OpaquePtr],
    ) -> Result<usize, ContainerError>;

    /// Replace row `row` with `values`; its length becomes `values.len()`.
    fn write_row(
        &self,
        address: Address,
        row: usize,
        values: &[OpaquePtr],
    ) -> Result<(), ContainerError>;

    /// Storage statistics for the container.
    fn stats(&self, address: Address) -> Result<ContainerStats, ContainerError>;
}
