//! Test utilities and mock types for ptrvec development.
//!
//! Provides [`MockBridge`], an in-memory [`NativeBridge`] that keeps every
//! container as a `Vec<Vec<OpaquePtr>>` and counts allocations and
//! releases, so lifecycle properties can be checked without the C ABI.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ptrvec_core::{Address, ContainerError, ContainerStats, NativeBridge, OpaquePtr};

#[derive(Default)]
struct MockState {
    containers: HashMap<u64, Vec<Vec<OpaquePtr>>>,
    next_address: u64,
    allocations: usize,
    releases: usize,
    fail_next_allocation: bool,
}

/// In-memory [`NativeBridge`].
///
/// Clones share state, so a proxy and a wrap built from clones of the same
/// bridge see the same containers. Addresses start at 1 and are never
/// reused, which makes a released address permanently stale.
#[derive(Clone, Default)]
pub struct MockBridge {
    state: Rc<RefCell<MockState>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.state.borrow().allocations
    }

    /// Successful releases so far.
    pub fn releases(&self) -> usize {
        self.state.borrow().releases
    }

    /// Containers allocated and not yet released.
    pub fn live(&self) -> usize {
        self.state.borrow().containers.len()
    }

    pub fn is_live(&self, address: Address) -> bool {
        self.state.borrow().containers.contains_key(&address.0)
    }

    /// Make the next `allocate` fail with `AllocationFailed`.
    pub fn fail_next_allocation(&self) {
        self.state.borrow_mut().fail_next_allocation = true;
    }

    fn with<R>(
        &self,
        address: Address,
        f: impl FnOnce(&mut Vec<Vec<OpaquePtr>>) -> Result<R, ContainerError>,
    ) -> Result<R, ContainerError> {
        let mut state = self.state.borrow_mut();
        let rows = state
            .containers
            .get_mut(&address.0)
            .ok_or(ContainerError::InvalidState { address })?;
        f(rows)
    }
}

fn row_of(rows: &mut [Vec<OpaquePtr>], row: usize) -> Result<&mut Vec<OpaquePtr>, ContainerError> {
    rows.get_mut(row)
        .ok_or(ContainerError::IndexOutOfBounds { row, column: None })
}

impl NativeBridge for MockBridge {
    fn allocate(&self, rows: usize) -> Result<Address, ContainerError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_allocation) {
            return Err(ContainerError::AllocationFailed);
        }
        state.next_address += 1;
        let address = state.next_address;
        state.containers.insert(address, vec![Vec::new(); rows]);
        state.allocations += 1;
        Ok(Address(address))
    }

    fn release(&self, address: Address) -> Result<(), ContainerError> {
        let mut state = self.state.borrow_mut();
        state
            .containers
            .remove(&address.0)
            .ok_or(ContainerError::InvalidState { address })?;
        state.releases += 1;
        Ok(())
    }

    fn assign(&self, dst: Address, src: Address) -> Result<(), ContainerError> {
        let copy = self.with(src, |rows| Ok(rows.clone()))?;
        self.with(dst, |rows| {
            *rows = copy;
            Ok(())
        })
    }

    fn len(&self, address: Address) -> Result<usize, ContainerError> {
        self.with(address, |rows| Ok(rows.len()))
    }

    fn resize(&self, address: Address, rows: usize) -> Result<(), ContainerError> {
        self.with(address, |r| {
            r.resize(rows, Vec::new());
            Ok(())
        })
    }

    fn row_len(&self, address: Address, row: usize) -> Result<usize, ContainerError> {
        self.with(address, |rows| Ok(row_of(rows, row)?.len()))
    }

    fn resize_row(&self, address: Address, row: usize, len: usize) -> Result<(), ContainerError> {
        self.with(address, |rows| {
            row_of(rows, row)?.resize(len, OpaquePtr::NULL);
            Ok(())
        })
    }

    fn get(
        &self,
        address: Address,
        row: usize,
        column: usize,
    ) -> Result<OpaquePtr, ContainerError> {
        self.with(address, |rows| {
            row_of(rows, row)?
                .get(column)
                .copied()
                .ok_or(ContainerError::IndexOutOfBounds {
                    row,
                    column: Some(column),
                })
        })
    }

    fn put(
        &self,
        address: Address,
        row: usize,
        column: usize,
        value: OpaquePtr,
    ) -> Result<(), ContainerError> {
        self.with(address, |rows| {
            let slot = row_of(rows, row)?
                .get_mut(column)
                .ok_or(ContainerError::IndexOutOfBounds {
                    row,
                    column: Some(column),
                })?;
            *slot = value;
            Ok(())
        })
    }

    fn read_row(
        &self,
        address: Address,
        row: usize,
        buf: &mut [OpaquePtr],
    ) -> Result<usize, ContainerError> {
        self.with(address, |rows| {
            let values = row_of(rows, row)?;
            if buf.len() < values.len() {
                return Err(ContainerError::BufferTooSmall {
                    needed: values.len(),
                    capacity: buf.len(),
                });
            }
            buf[..values.len()].copy_from_slice(values);
            Ok(values.len())
        })
    }

    fn write_row(
        &self,
        address: Address,
        row: usize,
        values: &[OpaquePtr],
    ) -> Result<(), ContainerError> {
        self.with(address, |rows| {
            *row_of(rows, row)? = values.to_vec();
            Ok(())
        })
    }

    fn stats(&self, address: Address) -> Result<ContainerStats, ContainerError> {
        self.with(address, |rows| {
            let slots_used = rows.iter().map(Vec::len).sum();
            Ok(ContainerStats {
                rows: rows.len(),
                slots_used,
                slots_reserved: rows.iter().map(Vec::capacity).sum(),
                segments: 0,
                memory_bytes: slots_used * std::mem::size_of::<OpaquePtr>(),
            })
        })
    }
}
