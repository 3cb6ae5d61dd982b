//! The nested pointer container proxy.

use std::fmt;

use ptrvec_core::{Address, ContainerError, ContainerStats, NativeBridge, OpaquePtr};

use crate::bridge::FfiBridge;
use crate::row::{RowView, RowViewMut};

/// Proxy for a native two-level container of opaque pointers.
///
/// The proxy is an [`Address`] plus an ownership flag. It caches nothing:
/// every length and element is fetched from the native object through the
/// bridge `B`, and every index is bounds-checked on the native side.
///
/// An owning proxy releases its native object exactly once, when it is
/// dropped or when [`release`](Self::release) is called. A proxy built by
/// [`wrap`](Self::wrap) never releases anything. A proxy holding
/// [`Address::NULL`] (after `release`, or wrapped over null) fails every
/// operation with [`ContainerError::InvalidState`].
///
/// Opaque pointer values are stored and returned as-is. Overwriting,
/// truncating or dropping never releases the pointees.
pub struct NestedPointerContainer<B: NativeBridge = FfiBridge> {
    address: Address,
    owns: bool,
    bridge: B,
}

impl NestedPointerContainer<FfiBridge> {
    /// Allocate an empty native container and own it.
    pub fn new() -> Result<Self, ContainerError> {
        Self::new_in(FfiBridge::new())
    }

    /// Allocate a native container with `rows` empty rows and own it.
    pub fn with_rows(rows: usize) -> Result<Self, ContainerError> {
        Self::with_rows_in(rows, FfiBridge::new())
    }

    /// Refer to a native container owned elsewhere.
    ///
    /// No allocation happens and the proxy will never release `address`.
    /// Validity is checked by each operation, not here.
    pub fn wrap(address: Address) -> Self {
        Self::wrap_in(address, FfiBridge::new())
    }

    /// Allocate a native container holding a copy of `rows`.
    pub fn from_rows<R: AsRef<[OpaquePtr]>>(rows: &[R]) -> Result<Self, ContainerError> {
        Self::from_rows_in(rows, FfiBridge::new())
    }
}

impl<B: NativeBridge> NestedPointerContainer<B> {
    /// Allocate an empty native container through `bridge` and own it.
    pub fn new_in(bridge: B) -> Result<Self, ContainerError> {
        Self::with_rows_in(0, bridge)
    }

    /// Allocate a native container with `rows` empty rows through `bridge`.
    pub fn with_rows_in(rows: usize, bridge: B) -> Result<Self, ContainerError> {
        let address = bridge.allocate(rows)?;
        Ok(Self {
            address,
            owns: true,
            bridge,
        })
    }

    /// Refer to a native container owned elsewhere, through `bridge`.
    pub fn wrap_in(address: Address, bridge: B) -> Self {
        log::trace!("ptrvec: wrapping container {address}");
        Self {
            address,
            owns: false,
            bridge,
        }
    }

    /// Allocate a native container through `bridge` holding a copy of `rows`.
    ///
    /// If any row fails to transfer, the partially built container is
    /// released before the error is returned.
    pub fn from_rows_in<R: AsRef<[OpaquePtr]>>(
        rows: &[R],
        bridge: B,
    ) -> Result<Self, ContainerError> {
        let mut container = Self::with_rows_in(rows.len(), bridge)?;
        for (i, row) in rows.iter().enumerate() {
            let values = row.as_ref();
            if !values.is_empty() {
                container.set_row(i, values)?;
            }
        }
        Ok(container)
    }

    /// The native address this proxy refers to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether this proxy will release its native object.
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// The bridge this proxy talks through.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Whether the address currently names a live native container.
    pub fn is_valid(&self) -> bool {
        !self.address.is_null() && self.bridge.len(self.address).is_ok()
    }

    fn live(&self) -> Result<Address, ContainerError> {
        if self.address.is_null() {
            return Err(ContainerError::InvalidState {
                address: self.address,
            });
        }
        Ok(self.address)
    }

    /// Replace this container's contents with a copy of `other`'s.
    ///
    /// Row structure and pointer values are copied; pointees are not. The
    /// receiver keeps its address and ownership, and `other` is unchanged.
    /// Assigning from a proxy of the same address is a no-op.
    pub fn assign(&mut self, other: &Self) -> Result<&mut Self, ContainerError> {
        let dst = self.live()?;
        let src = other.live()?;
        self.bridge.assign(dst, src)?;
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> Result<usize, ContainerError> {
        self.bridge.len(self.live()?)
    }

    /// Whether the container has no rows.
    pub fn is_empty(&self) -> Result<bool, ContainerError> {
        Ok(self.len()? == 0)
    }

    /// Grow with empty rows or truncate to exactly `rows` rows.
    ///
    /// Pointer values in discarded rows are not released.
    pub fn resize(&mut self, rows: usize) -> Result<(), ContainerError> {
        self.bridge.resize(self.live()?, rows)
    }

    /// Length of row `row`.
    pub fn row_len(&self, row: usize) -> Result<usize, ContainerError> {
        self.bridge.row_len(self.live()?, row)
    }

    /// Whether row `row` is empty.
    pub fn row_is_empty(&self, row: usize) -> Result<bool, ContainerError> {
        Ok(self.row_len(row)? == 0)
    }

    /// Grow row `row` with null pointers or truncate it to `len` slots.
    pub fn resize_row(&mut self, row: usize, len: usize) -> Result<(), ContainerError> {
        self.bridge.resize_row(self.live()?, row, len)
    }

    /// The pointer at (`row`, `column`).
    pub fn get(&self, row: usize, column: usize) -> Result<OpaquePtr, ContainerError> {
        self.bridge.get(self.live()?, row, column)
    }

    /// Overwrite the pointer at (`row`, `column`).
    ///
    /// The previous value is not released.
    pub fn set(
        &mut self,
        row: usize,
        column: usize,
        value: OpaquePtr,
    ) -> Result<(), ContainerError> {
        self.bridge.put(self.live()?, row, column, value)
    }

    /// Replace row `row` with `values` in one transfer.
    pub fn set_row(&mut self, row: usize, values: &[OpaquePtr]) -> Result<(), ContainerError> {
        self.bridge.write_row(self.live()?, row, values)
    }

    /// A read-only view of row `row`.
    pub fn row(&self, row: usize) -> Result<RowView<'_, B>, ContainerError> {
        self.row_len(row)?;
        Ok(RowView::new(self, row))
    }

    /// A mutable view of row `row`.
    pub fn row_mut(&mut self, row: usize) -> Result<RowViewMut<'_, B>, ContainerError> {
        self.row_len(row)?;
        Ok(RowViewMut::new(self, row))
    }

    /// Copy row `row` out of the native container.
    pub(crate) fn read_row(&self, row: usize) -> Result<Vec<OpaquePtr>, ContainerError> {
        let address = self.live()?;
        let mut buf = vec![OpaquePtr::NULL; self.bridge.row_len(address, row)?];
        let len = self.bridge.read_row(address, row, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Copy row `row` into the front of `buf`, returning the row length.
    pub(crate) fn read_row_into(
        &self,
        row: usize,
        buf: &mut [OpaquePtr],
    ) -> Result<usize, ContainerError> {
        self.bridge.read_row(self.live()?, row, buf)
    }

    /// Copy the whole container out as nested vectors.
    pub fn to_rows(&self) -> Result<Vec<Vec<OpaquePtr>>, ContainerError> {
        (0..self.len()?).map(|row| self.read_row(row)).collect()
    }

    /// Storage statistics of the native object.
    pub fn stats(&self) -> Result<ContainerStats, ContainerError> {
        self.bridge.stats(self.live()?)
    }

    /// Release the native object now.
    ///
    /// An owning proxy releases its object; a wrapping proxy only lets go of
    /// the address. Either way the proxy is invalid afterwards.
    pub fn release(&mut self) -> Result<(), ContainerError> {
        let address = self.live()?;
        let owns = self.owns;
        self.address = Address::NULL;
        self.owns = false;
        if owns {
            self.bridge.release(address)?;
        }
        Ok(())
    }

    /// Give up ownership and return the address.
    ///
    /// The caller becomes responsible for releasing the native object.
    pub fn into_address(mut self) -> Address {
        self.owns = false;
        self.address
    }
}

impl<B: NativeBridge + Clone> NestedPointerContainer<B> {
    /// Allocate a new owned container holding a copy of this one.
    pub fn try_clone(&self) -> Result<Self, ContainerError> {
        let mut copy = Self::new_in(self.bridge.clone())?;
        copy.assign(self)?;
        Ok(copy)
    }
}

impl<B: NativeBridge> Drop for NestedPointerContainer<B> {
    fn drop(&mut self) {
        if self.owns && !self.address.is_null() {
            if let Err(e) = self.bridge.release(self.address) {
                log::warn!("ptrvec: failed to release container {}: {e}", self.address);
            }
        }
    }
}

impl<B: NativeBridge> fmt::Debug for NestedPointerContainer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NestedPointerContainer");
        s.field("address", &format_args!("{}", self.address))
            .field("owns", &self.owns);
        let row_lens: Option<Vec<usize>> = self.len().ok().and_then(|rows| {
            (0..rows).map(|row| self.row_len(row).ok()).collect()
        });
        match row_lens {
            Some(lens) => s.field("row_lens", &lens).finish(),
            None => s.finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptrvec_test_utils::MockBridge;

    fn p(addr: usize) -> OpaquePtr {
        OpaquePtr::from_addr(addr)
    }

    #[test]
    fn new_is_empty_and_owning() {
        let bridge = MockBridge::new();
        let c = NestedPointerContainer::new_in(bridge.clone()).unwrap();
        assert!(c.owns());
        assert!(c.is_valid());
        assert_eq!(c.len().unwrap(), 0);
        assert!(c.is_empty().unwrap());
        assert_eq!(bridge.allocations(), 1);
    }

    #[test]
    fn with_rows_rows_are_empty() {
        let c = NestedPointerContainer::with_rows_in(4, MockBridge::new()).unwrap();
        assert_eq!(c.len().unwrap(), 4);
        for row in 0..4 {
            assert!(c.row_is_empty(row).unwrap());
        }
    }

    #[test]
    fn allocation_failure_is_reported() {
        let bridge = MockBridge::new();
        bridge.fail_next_allocation();
        assert_eq!(
            NestedPointerContainer::with_rows_in(2, bridge.clone()).err(),
            Some(ContainerError::AllocationFailed)
        );
        assert_eq!(bridge.live(), 0);
    }

    #[test]
    fn owning_drop_releases_once() {
        let bridge = MockBridge::new();
        {
            let _c = NestedPointerContainer::with_rows_in(1, bridge.clone()).unwrap();
        }
        assert_eq!(bridge.releases(), 1);
        assert_eq!(bridge.live(), 0);
    }

    #[test]
    fn wrap_drop_never_releases() {
        let bridge = MockBridge::new();
        let owner = NestedPointerContainer::with_rows_in(1, bridge.clone()).unwrap();
        {
            let view = NestedPointerContainer::wrap_in(owner.address(), bridge.clone());
            assert!(!view.owns());
            assert_eq!(view.len().unwrap(), 1);
        }
        assert_eq!(bridge.releases(), 0);
        drop(owner);
        assert_eq!(bridge.releases(), 1);
    }

    #[test]
    fn explicit_release_then_drop_releases_once() {
        let bridge = MockBridge::new();
        let mut c = NestedPointerContainer::new_in(bridge.clone()).unwrap();
        let address = c.address();
        c.release().unwrap();
        assert!(!c.is_valid());
        assert_eq!(c.len(), Err(ContainerError::InvalidState { address: Address::NULL }));
        assert_eq!(
            c.release(),
            Err(ContainerError::InvalidState { address: Address::NULL })
        );
        drop(c);
        assert_eq!(bridge.releases(), 1);
        assert!(!bridge.is_live(address));
    }

    #[test]
    fn into_address_transfers_ownership() {
        let bridge = MockBridge::new();
        let c = NestedPointerContainer::with_rows_in(2, bridge.clone()).unwrap();
        let address = c.into_address();
        assert_eq!(bridge.releases(), 0);

        let adopted = NestedPointerContainer::wrap_in(address, bridge.clone());
        assert_eq!(adopted.len().unwrap(), 2);
        bridge.release(address).unwrap();
        assert_eq!(bridge.releases(), 1);
    }

    #[test]
    fn null_wrap_is_invalid() {
        let bridge = MockBridge::new();
        let mut c = NestedPointerContainer::wrap_in(Address::NULL, bridge.clone());
        let invalid = ContainerError::InvalidState {
            address: Address::NULL,
        };
        assert!(!c.is_valid());
        assert_eq!(c.len(), Err(invalid.clone()));
        assert_eq!(c.resize(1), Err(invalid.clone()));
        assert_eq!(c.get(0, 0), Err(invalid));
        drop(c);
        assert_eq!(bridge.releases(), 0);
    }

    #[test]
    fn resize_row_set_get_scenario() {
        let mut c = NestedPointerContainer::with_rows_in(3, MockBridge::new()).unwrap();
        c.resize_row(1, 5).unwrap();
        c.set(1, 4, p(0xabc)).unwrap();
        assert_eq!(c.row_len(1).unwrap(), 5);
        assert_eq!(c.get(1, 4).unwrap(), p(0xabc));
        assert!(c.get(1, 0).unwrap().is_null());
        assert_eq!(c.len().unwrap(), 3);
    }

    #[test]
    fn out_of_bounds_access() {
        let mut c = NestedPointerContainer::with_rows_in(2, MockBridge::new()).unwrap();
        c.resize_row(0, 1).unwrap();
        assert_eq!(
            c.get(0, 1),
            Err(ContainerError::IndexOutOfBounds {
                row: 0,
                column: Some(1)
            })
        );
        assert_eq!(
            c.row_len(2),
            Err(ContainerError::IndexOutOfBounds { row: 2, column: None })
        );
        assert!(c.row(5).is_err());
        assert!(c.row_mut(2).is_err());
    }

    #[test]
    fn assign_copies_and_keeps_address() {
        let bridge = MockBridge::new();
        let src =
            NestedPointerContainer::from_rows_in(&[vec![p(1)], vec![p(2), p(3)]], bridge.clone())
                .unwrap();
        let mut dst = NestedPointerContainer::with_rows_in(7, bridge.clone()).unwrap();
        let before = dst.address();

        dst.assign(&src).unwrap().set(0, 0, p(9)).unwrap();
        assert_eq!(dst.address(), before);
        assert_eq!(dst.to_rows().unwrap(), vec![vec![p(9)], vec![p(2), p(3)]]);
        assert_eq!(src.to_rows().unwrap(), vec![vec![p(1)], vec![p(2), p(3)]]);
    }

    #[test]
    fn assign_from_wrap_of_self_is_noop() {
        let bridge = MockBridge::new();
        let mut c = NestedPointerContainer::from_rows_in(&[[p(5)]], bridge.clone()).unwrap();
        let alias = NestedPointerContainer::wrap_in(c.address(), bridge.clone());
        c.assign(&alias).unwrap();
        assert_eq!(c.get(0, 0).unwrap(), p(5));
    }

    #[test]
    fn assign_from_released_source_fails() {
        let bridge = MockBridge::new();
        let mut dst = NestedPointerContainer::with_rows_in(1, bridge.clone()).unwrap();
        let mut src = NestedPointerContainer::with_rows_in(3, bridge.clone()).unwrap();
        src.release().unwrap();
        assert!(matches!(
            dst.assign(&src),
            Err(ContainerError::InvalidState { .. })
        ));
        assert_eq!(dst.len().unwrap(), 1);
    }

    #[test]
    fn try_clone_is_independent() {
        let bridge = MockBridge::new();
        let mut a = NestedPointerContainer::from_rows_in(&[[p(1), p(2)]], bridge.clone()).unwrap();
        let b = a.try_clone().unwrap();
        assert_ne!(a.address(), b.address());
        a.set(0, 0, p(7)).unwrap();
        assert_eq!(b.get(0, 0).unwrap(), p(1));
        drop((a, b));
        assert_eq!(bridge.releases(), 2);
    }

    #[test]
    fn debug_shows_row_lengths() {
        let c = NestedPointerContainer::from_rows_in(&[vec![p(1), p(2)], vec![]], MockBridge::new())
            .unwrap();
        let text = format!("{c:?}");
        assert!(text.contains("owns: true"), "got {text}");
        assert!(text.contains("row_lens: [2, 0]"), "got {text}");

        let null = NestedPointerContainer::wrap_in(Address::NULL, MockBridge::new());
        assert!(format!("{null:?}").ends_with(".. }"));
    }
}
