//! Borrowed views of a single row.
//!
//! A view is a container reference plus a row index. It reads through the
//! bridge on every call and only copies the row when asked to
//! ([`RowView::to_vec`], [`RowView::read_into`]).

use ptrvec_core::{ContainerError, NativeBridge, OpaquePtr};

use crate::container::NestedPointerContainer;

/// Read-only view of one row, from [`NestedPointerContainer::row`].
pub struct RowView<'a, B: NativeBridge> {
    container: &'a NestedPointerContainer<B>,
    row: usize,
}

impl<'a, B: NativeBridge> RowView<'a, B> {
    pub(crate) fn new(container: &'a NestedPointerContainer<B>, row: usize) -> Self {
        Self { container, row }
    }

    /// The row index this view refers to.
    pub fn index(&self) -> usize {
        self.row
    }

    /// Current length of the row.
    pub fn len(&self) -> Result<usize, ContainerError> {
        self.container.row_len(self.row)
    }

    /// Whether the row is empty.
    pub fn is_empty(&self) -> Result<bool, ContainerError> {
        self.container.row_is_empty(self.row)
    }

    /// The pointer at `column`.
    pub fn get(&self, column: usize) -> Result<OpaquePtr, ContainerError> {
        self.container.get(self.row, column)
    }

    /// Copy the row out.
    pub fn to_vec(&self) -> Result<Vec<OpaquePtr>, ContainerError> {
        self.container.read_row(self.row)
    }

    /// Copy the row into the front of `buf`, returning its length.
    ///
    /// Fails with [`ContainerError::BufferTooSmall`] if `buf` is shorter
    /// than the row.
    pub fn read_into(&self, buf: &mut [OpaquePtr]) -> Result<usize, ContainerError> {
        self.container.read_row_into(self.row, buf)
    }
}

/// Mutable view of one row, from [`NestedPointerContainer::row_mut`].
pub struct RowViewMut<'a, B: NativeBridge> {
    container: &'a mut NestedPointerContainer<B>,
    row: usize,
}

impl<'a, B: NativeBridge> RowViewMut<'a, B> {
    pub(crate) fn new(container: &'a mut NestedPointerContainer<B>, row: usize) -> Self {
        Self { container, row }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> RowView<'_, B> {
        RowView::new(self.container, self.row)
    }

    /// The row index this view refers to.
    pub fn index(&self) -> usize {
        self.row
    }

    /// Current length of the row.
    pub fn len(&self) -> Result<usize, ContainerError> {
        self.container.row_len(self.row)
    }

    /// Whether the row is empty.
    pub fn is_empty(&self) -> Result<bool, ContainerError> {
        self.container.row_is_empty(self.row)
    }

    /// The pointer at `column`.
    pub fn get(&self, column: usize) -> Result<OpaquePtr, ContainerError> {
        self.container.get(self.row, column)
    }

    /// Copy the row out.
    pub fn to_vec(&self) -> Result<Vec<OpaquePtr>, ContainerError> {
        self.container.read_row(self.row)
    }

    /// Overwrite the pointer at `column`. The old value is not released.
    pub fn set(&mut self, column: usize, value: OpaquePtr) -> Result<(), ContainerError> {
        self.container.set(self.row, column, value)
    }

    /// Grow with null pointers or truncate to `len` slots.
    pub fn resize(&mut self, len: usize) -> Result<(), ContainerError> {
        self.container.resize_row(self.row, len)
    }

    /// Replace the row's contents with `values`.
    pub fn assign_from_slice(&mut self, values: &[OpaquePtr]) -> Result<(), ContainerError> {
        self.container.set_row(self.row, values)
    }
}
