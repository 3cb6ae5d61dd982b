//! [`NativeBridge`] over the `ptrvec-ffi` C ABI.
//!
//! The proxy talks to the C entry points exactly as a foreign caller would:
//! handles in, status codes and out-pointers back. Each status is mapped to
//! a [`ContainerError`] here, with the row and column of the call attached
//! for index failures.

use std::ffi::c_void;

use ptrvec_arena::ArenaConfig;
use ptrvec_core::{Address, ContainerError, ContainerStats, NativeBridge, OpaquePtr};
use ptrvec_ffi::{PtrvecArenaConfig, PtrvecStats, PtrvecStatus};

/// The production bridge: every call goes through the `ptrvec_*` C ABI.
///
/// Containers allocated by a bridge built with [`with_config`](Self::with_config)
/// get those storage limits; the default bridge uses
/// [`ArenaConfig::default`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FfiBridge {
    config: Option<PtrvecArenaConfig>,
}

impl FfiBridge {
    /// A bridge that allocates with the default storage limits.
    pub const fn new() -> Self {
        Self { config: None }
    }

    /// A bridge that allocates with explicit storage limits.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            config: Some(PtrvecArenaConfig::from(&config)),
        }
    }
}

/// Index context of a call, used to fill in `IndexOutOfBounds`.
#[derive(Clone, Copy)]
enum At {
    Container,
    Row(usize),
    Cell(usize, usize),
}

fn check(code: i32, address: Address, at: At) -> Result<(), ContainerError> {
    match PtrvecStatus::from_code(code) {
        Some(PtrvecStatus::Ok) => Ok(()),
        Some(PtrvecStatus::InvalidHandle) => Err(ContainerError::InvalidState { address }),
        Some(PtrvecStatus::AllocationFailed) => Err(ContainerError::AllocationFailed),
        Some(PtrvecStatus::IndexOutOfBounds) => match at {
            At::Row(row) => Err(ContainerError::IndexOutOfBounds { row, column: None }),
            At::Cell(row, column) => Err(ContainerError::IndexOutOfBounds {
                row,
                column: Some(column),
            }),
            At::Container => Err(ContainerError::Bridge { status: code }),
        },
        _ => Err(ContainerError::Bridge { status: code }),
    }
}

impl NativeBridge for FfiBridge {
    fn allocate(&self, rows: usize) -> Result<Address, ContainerError> {
        let mut handle = 0u64;
        let code = match &self.config {
            Some(config) => ptrvec_ffi::ptrvec_create_with_config(rows, config, &mut handle),
            None => ptrvec_ffi::ptrvec_create_rows(rows, &mut handle),
        };
        check(code, Address::NULL, At::Container)?;
        Ok(Address(handle))
    }

    fn release(&self, address: Address) -> Result<(), ContainerError> {
        check(
            ptrvec_ffi::ptrvec_destroy(address.0),
            address,
            At::Container,
        )
    }

    fn assign(&self, dst: Address, src: Address) -> Result<(), ContainerError> {
        let code = ptrvec_ffi::ptrvec_assign(dst.0, src.0);
        if code == PtrvecStatus::InvalidHandle as i32 {
            // Report whichever side is stale.
            let mut rows = 0usize;
            let dst_live = ptrvec_ffi::ptrvec_size(dst.0, &mut rows) == PtrvecStatus::Ok as i32;
            let address = if dst_live { src } else { dst };
            return Err(ContainerError::InvalidState { address });
        }
        check(code, dst, At::Container)
    }

    fn len(&self, address: Address) -> Result<usize, ContainerError> {
        let mut rows = 0usize;
        check(
            ptrvec_ffi::ptrvec_size(address.0, &mut rows),
            address,
            At::Container,
        )?;
        Ok(rows)
    }

    fn resize(&self, address: Address, rows: usize) -> Result<(), ContainerError> {
        check(
            ptrvec_ffi::ptrvec_resize(address.0, rows),
            address,
            At::Container,
        )
    }

    fn row_len(&self, address: Address, row: usize) -> Result<usize, ContainerError> {
        let mut len = 0usize;
        check(
            ptrvec_ffi::ptrvec_row_size(address.0, row, &mut len),
            address,
            At::Row(row),
        )?;
        Ok(len)
    }

    fn resize_row(&self, address: Address, row: usize, len: usize) -> Result<(), ContainerError> {
        check(
            ptrvec_ffi::ptrvec_row_resize(address.0, row, len),
            address,
            At::Row(row),
        )
    }

    fn get(
        &self,
        address: Address,
        row: usize,
        column: usize,
    ) -> Result<OpaquePtr, ContainerError> {
        let mut value: *mut c_void = std::ptr::null_mut();
        check(
            ptrvec_ffi::ptrvec_get(address.0, row, column, &mut value),
            address,
            At::Cell(row, column),
        )?;
        Ok(OpaquePtr::from_mut_ptr(value))
    }

    fn put(
        &self,
        address: Address,
        row: usize,
        column: usize,
        value: OpaquePtr,
    ) -> Result<(), ContainerError> {
        check(
            ptrvec_ffi::ptrvec_put(address.0, row, column, value.as_ptr()),
            address,
            At::Cell(row, column),
        )
    }

    fn read_row(
        &self,
        address: Address,
        row: usize,
        buf: &mut [OpaquePtr],
    ) -> Result<usize, ContainerError> {
        let mut scratch: Vec<*mut c_void> = vec![std::ptr::null_mut(); buf.len()];
        let mut len = 0usize;
        let code = ptrvec_ffi::ptrvec_row_read(
            address.0,
            row,
            scratch.as_mut_ptr(),
            scratch.len(),
            &mut len,
        );
        if code == PtrvecStatus::BufferTooSmall as i32 {
            return Err(ContainerError::BufferTooSmall {
                needed: len,
                capacity: buf.len(),
            });
        }
        check(code, address, At::Row(row))?;
        for (dst, src) in buf.iter_mut().zip(&scratch[..len]) {
            *dst = OpaquePtr::from_mut_ptr(*src);
        }
        Ok(len)
    }

    fn write_row(
        &self,
        address: Address,
        row: usize,
        values: &[OpaquePtr],
    ) -> Result<(), ContainerError> {
        let raw: Vec<*mut c_void> = values.iter().map(|v| v.as_ptr()).collect();
        check(
            ptrvec_ffi::ptrvec_row_write(address.0, row, raw.as_ptr(), raw.len()),
            address,
            At::Row(row),
        )
    }

    fn stats(&self, address: Address) -> Result<ContainerStats, ContainerError> {
        let mut stats = PtrvecStats::default();
        check(
            ptrvec_ffi::ptrvec_stats_get(address.0, &mut stats),
            address,
            At::Container,
        )?;
        Ok(stats.to_rust())
    }
}
