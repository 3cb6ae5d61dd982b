//! Container lifecycle and access FFI.
//!
//! Uses a per-container `Arc<Mutex<RowStore>>` so the global `CONTAINERS`
//! table lock is held only for handle lookup. Operations on different
//! containers never contend on each other's data.

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use ptrvec_arena::{ArenaConfig, RowStore};
use ptrvec_core::OpaquePtr;

use crate::config::PtrvecArenaConfig;
use crate::handle::HandleTable;
use crate::status::PtrvecStatus;

type StoreArc = Arc<Mutex<RowStore>>;

static CONTAINERS: Mutex<HandleTable<StoreArc>> = Mutex::new(HandleTable::new());

/// Clone the Arc for a container handle, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the table mutex is poisoned.
pub(crate) fn get_store(handle: u64) -> Option<StoreArc> {
    CONTAINERS.lock().ok()?.get(handle).cloned()
}

#[allow(unsafe_code)]
fn insert_store(store: RowStore, out: *mut u64) -> i32 {
    let rows = store.len();
    let handle = ffi_lock!(CONTAINERS).insert(Arc::new(Mutex::new(store)));
    log::debug!("ptrvec: created container {handle:#x} with {rows} rows");
    // SAFETY: out is non-null (checked by every caller) and valid per
    // caller contract.
    unsafe { *out = handle };
    PtrvecStatus::Ok as i32
}

fn create_store(rows: usize, config: ArenaConfig, out: *mut u64) -> i32 {
    if out.is_null() {
        return PtrvecStatus::InvalidArgument as i32;
    }
    match RowStore::with_rows(config, rows) {
        Ok(store) => insert_store(store, out),
        Err(e) => {
            log::debug!("ptrvec: allocation of {rows} rows failed: {e}");
            PtrvecStatus::from(&e) as i32
        }
    }
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Allocate an empty container. Writes its handle to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_create(out: *mut u64) -> i32 {
    ffi_guard!({ create_store(0, ArenaConfig::default(), out) })
}

/// Allocate a container holding `n` empty rows. Writes its handle to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_create_rows(n: usize, out: *mut u64) -> i32 {
    ffi_guard!({ create_store(n, ArenaConfig::default(), out) })
}

/// Allocate a container holding `n` empty rows with explicit storage
/// limits. `config` may be null to use the defaults.
///
/// Returns `InvalidArgument` if `config` holds out-of-range values.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_create_with_config(
    n: usize,
    config: *const PtrvecArenaConfig,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        let config = if config.is_null() {
            ArenaConfig::default()
        } else {
            // SAFETY: config is non-null and points to a valid struct per
            // caller contract.
            match unsafe { &*config }.to_arena() {
                Some(c) => c,
                None => return PtrvecStatus::InvalidArgument as i32,
            }
        };
        create_store(n, config, out)
    })
}

/// Destroy a container, releasing its storage.
///
/// Pointer values held in the container are not touched. Destroying the
/// same handle twice returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(CONTAINERS).remove(handle) {
            Some(_) => {
                log::debug!("ptrvec: destroyed container {handle:#x}");
                PtrvecStatus::Ok as i32
            }
            None => PtrvecStatus::InvalidHandle as i32,
        }
    })
}

/// Replace the contents of `dst` with a copy of `src`.
///
/// Row structure and pointer values are copied; pointees are not. `dst`
/// keeps its handle and its storage limits. Assigning a container to
/// itself is a no-op.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_assign(dst: u64, src: u64) -> i32 {
    ffi_guard!({
        let dst_arc = match get_store(dst) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        if dst == src {
            return PtrvecStatus::Ok as i32;
        }
        let src_arc = match get_store(src) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        // Lock in ascending handle order.
        let (mut dst_store, src_store) = if dst < src {
            let d = ffi_lock!(dst_arc);
            let s = ffi_lock!(src_arc);
            (d, s)
        } else {
            let s = ffi_lock!(src_arc);
            let d = ffi_lock!(dst_arc);
            (d, s)
        };
        match dst_store.assign_from(&src_store) {
            Ok(()) => PtrvecStatus::Ok as i32,
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

/// Number of live containers in this process.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_live_count(out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let count = ffi_lock!(CONTAINERS).len();
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = count };
        PtrvecStatus::Ok as i32
    })
}

// ── Outer sequence ──────────────────────────────────────────────

/// Number of rows. Writes the count to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_size(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = store.len() };
        PtrvecStatus::Ok as i32
    })
}

/// Whether the container has no rows. Writes 1 (empty) or 0 to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_empty(handle: u64, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = u8::from(store.is_empty()) };
        PtrvecStatus::Ok as i32
    })
}

/// Grow or shrink the container to exactly `n` rows.
///
/// New rows are empty. Pointer values in truncated rows are discarded
/// without being released.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_resize(handle: u64, n: usize) -> i32 {
    ffi_guard!({
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let mut store = ffi_lock!(arc);
        match store.resize(n) {
            Ok(()) => PtrvecStatus::Ok as i32,
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

// ── Rows ────────────────────────────────────────────────────────

/// Length of row `row`. Writes the length to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_row_size(handle: u64, row: usize, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        match store.row_len(row) {
            Ok(len) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { *out = len };
                PtrvecStatus::Ok as i32
            }
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

/// Whether row `row` is empty. Writes 1 (empty) or 0 to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_row_empty(handle: u64, row: usize, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        match store.row_len(row) {
            Ok(len) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { *out = u8::from(len == 0) };
                PtrvecStatus::Ok as i32
            }
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

/// Grow or shrink row `row` to exactly `n` slots. New slots are null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_row_resize(handle: u64, row: usize, n: usize) -> i32 {
    ffi_guard!({
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let mut store = ffi_lock!(arc);
        match store.resize_row(row, n) {
            Ok(()) => PtrvecStatus::Ok as i32,
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

/// Copy row `row` into `buf` (capacity `cap` pointers).
///
/// Always writes the row length to `len_out` when the row exists. Returns
/// `BufferTooSmall`, copying nothing, if `cap` is less than the length.
/// `buf` may be null when `cap` is 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_row_read(
    handle: u64,
    row: usize,
    buf: *mut *mut c_void,
    cap: usize,
    len_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if len_out.is_null() || (buf.is_null() && cap > 0) {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        let slots = match store.row(row) {
            Ok(s) => s,
            Err(e) => return PtrvecStatus::from(&e) as i32,
        };
        // SAFETY: len_out is non-null and valid per caller contract.
        unsafe { *len_out = slots.len() };
        if cap < slots.len() {
            return PtrvecStatus::BufferTooSmall as i32;
        }
        if !slots.is_empty() {
            // SAFETY: buf is non-null (cap >= len > 0) and points to cap
            // writable pointers per caller contract.
            let out = unsafe { std::slice::from_raw_parts_mut(buf, slots.len()) };
            for (dst, src) in out.iter_mut().zip(slots) {
                *dst = src.as_ptr();
            }
        }
        PtrvecStatus::Ok as i32
    })
}

/// Replace row `row` with the `n` pointers at `values`.
///
/// The row's length becomes `n`. `values` may be null when `n` is 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_row_write(
    handle: u64,
    row: usize,
    values: *const *mut c_void,
    n: usize,
) -> i32 {
    ffi_guard!({
        if values.is_null() && n > 0 {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let converted: Vec<OpaquePtr> = if n == 0 {
            Vec::new()
        } else {
            // SAFETY: values is non-null and points to n readable pointers
            // per caller contract.
            let src = unsafe { std::slice::from_raw_parts(values, n) };
            src.iter().map(|&p| OpaquePtr::from_mut_ptr(p)).collect()
        };
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let mut store = ffi_lock!(arc);
        match store.write_row(row, &converted) {
            Ok(()) => PtrvecStatus::Ok as i32,
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

// ── Elements ────────────────────────────────────────────────────

/// Read the pointer at (`row`, `column`) into `out`. The pointer is not
/// dereferenced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_get(
    handle: u64,
    row: usize,
    column: usize,
    out: *mut *mut c_void,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        match store.get(row, column) {
            Ok(value) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { *out = value.as_ptr() };
                PtrvecStatus::Ok as i32
            }
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}

/// Store `value` at (`row`, `column`), overwriting the previous pointer
/// without releasing it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_put(handle: u64, row: usize, column: usize, value: *mut c_void) -> i32 {
    ffi_guard!({
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let mut store = ffi_lock!(arc);
        match store.set(row, column, OpaquePtr::from_mut_ptr(value)) {
            Ok(()) => PtrvecStatus::Ok as i32,
            Err(e) => PtrvecStatus::from(&e) as i32,
        }
    })
}
