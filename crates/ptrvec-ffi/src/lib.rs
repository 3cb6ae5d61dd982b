//! C ABI for ptrvec native nested pointer containers.
//!
//! Every native container lives behind a `u64` handle in a process-wide
//! slot+generation table ([`handle`]). C callers, and the Rust proxy in the
//! `ptrvec` crate, address containers only through these handles, so a
//! destroyed or never-issued handle is reported as
//! [`PtrvecStatus::InvalidHandle`] rather than dereferenced.
//!
//! All entry points return an `i32` status and write results through
//! out-pointers. Panics are caught at the boundary and reported as
//! [`PtrvecStatus::Panicked`]; the message is retrievable with
//! [`ptrvec_last_panic_message`].
//!
//! This is the only ptrvec crate that contains `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

/// Run an FFI body, converting a panic into `$fallback`.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload);
                $fallback
            }
        }
    };
}

/// Run an FFI body returning a status, converting a panic into `Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::PtrvecStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing body if it
/// is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::PtrvecStatus::InternalError as i32,
        }
    };
}

pub mod config;
pub mod container;
pub(crate) mod handle;
pub mod stats;
pub mod status;

pub use config::PtrvecArenaConfig;
pub use container::*;
pub use stats::{ptrvec_stats_get, PtrvecStats};
pub use status::PtrvecStatus;

thread_local! {
    /// Message of the most recent panic caught on this thread.
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

pub(crate) fn record_panic(payload: Box<dyn Any + Send>) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    };
    log::error!("ptrvec: panic caught at FFI boundary: {message}");
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Copy the message of the last panic caught on this thread into `buf`.
///
/// Returns the full message length in bytes (excluding the terminator).
/// Writes at most `cap - 1` bytes plus a NUL terminator. Pass a null `buf`
/// to query the length only. Returns 0 if no panic has been caught.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    ffi_guard_or!(-1, {
        LAST_PANIC.with(|cell| {
            let message = cell.borrow();
            let bytes = message.as_bytes();
            if !buf.is_null() && cap > 0 {
                let n = bytes.len().min(cap - 1);
                // SAFETY: buf points to at least cap writable bytes per caller
                // contract, and n < cap leaves room for the terminator.
                unsafe {
                    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                    *buf.add(n) = 0;
                }
            }
            bytes.len().min(i32::MAX as usize) as i32
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PtrvecStatus;

    #[test]
    fn ffi_guard_catches_panic_and_stores_message() {
        LAST_PANIC.with(|cell| cell.borrow_mut().clear());

        let status = ffi_guard!({
            panic!("deliberate test panic at the boundary");
        });
        assert_eq!(status, PtrvecStatus::Panicked as i32);

        let len = ptrvec_last_panic_message(std::ptr::null_mut(), 0);
        assert!(len > 0);

        let mut buf = vec![0u8; len as usize + 1];
        let len2 = ptrvec_last_panic_message(buf.as_mut_ptr().cast::<c_char>(), buf.len());
        assert_eq!(len, len2);
        let msg = std::str::from_utf8(&buf[..len2 as usize]).unwrap();
        assert!(msg.contains("deliberate test panic at the boundary"), "got {msg:?}");
    }

    #[test]
    fn panic_message_truncates_to_buffer() {
        LAST_PANIC.with(|cell| *cell.borrow_mut() = "abcdefgh".to_string());
        let mut buf = [0xffu8; 4];
        let len = ptrvec_last_panic_message(buf.as_mut_ptr().cast::<c_char>(), buf.len());
        assert_eq!(len, 8);
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn no_panic_reports_zero_length() {
        LAST_PANIC.with(|cell| cell.borrow_mut().clear());
        assert_eq!(ptrvec_last_panic_message(std::ptr::null_mut(), 0), 0);
    }

    #[test]
    fn guard_passes_through_normal_values() {
        let value = ffi_guard_or!(0u64, { 41u64 + 1 });
        assert_eq!(value, 42);
    }
}
