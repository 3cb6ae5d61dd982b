//! Storage statistics FFI.

use ptrvec_core::ContainerStats;

use crate::container::get_store;
use crate::status::PtrvecStatus;

/// C-compatible container storage statistics.
///
/// All fields are `u64` so the layout is identical on 32- and 64-bit
/// targets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PtrvecStats {
    /// Number of rows.
    pub rows: u64,
    /// Live pointer slots across all rows.
    pub slots_used: u64,
    /// Slots reserved by rows, including spare capacity.
    pub slots_reserved: u64,
    /// Segments allocated by the container's storage.
    pub segments: u64,
    /// Approximate heap bytes held by the container.
    pub memory_bytes: u64,
}

const _: () = assert!(std::mem::size_of::<PtrvecStats>() == 40);
const _: () = assert!(std::mem::align_of::<PtrvecStats>() == 8);

impl PtrvecStats {
    fn from_rust(stats: &ContainerStats) -> Self {
        Self {
            rows: stats.rows as u64,
            slots_used: stats.slots_used as u64,
            slots_reserved: stats.slots_reserved as u64,
            segments: stats.segments as u64,
            memory_bytes: stats.memory_bytes as u64,
        }
    }

    /// Convert back to the Rust-side statistics type.
    pub fn to_rust(&self) -> ContainerStats {
        ContainerStats {
            rows: self.rows as usize,
            slots_used: self.slots_used as usize,
            slots_reserved: self.slots_reserved as usize,
            segments: self.segments as usize,
            memory_bytes: self.memory_bytes as usize,
        }
    }
}

/// Write storage statistics for a container to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_stats_get(handle: u64, out: *mut PtrvecStats) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        let arc = match get_store(handle) {
            Some(arc) => arc,
            None => return PtrvecStatus::InvalidHandle as i32,
        };
        let store = ffi_lock!(arc);
        let stats = PtrvecStats::from_rust(&store.stats());
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = stats };
        PtrvecStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ptrvec_create_rows, ptrvec_destroy, ptrvec_row_resize};

    #[test]
    fn stats_track_rows_and_slots() {
        let mut h = 0u64;
        assert_eq!(ptrvec_create_rows(3, &mut h), PtrvecStatus::Ok as i32);
        ptrvec_row_resize(h, 0, 5);
        ptrvec_row_resize(h, 2, 1);

        let mut stats = PtrvecStats::default();
        assert_eq!(ptrvec_stats_get(h, &mut stats), PtrvecStatus::Ok as i32);
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.slots_used, 6);
        assert_eq!(stats.slots_reserved, 8 + 4);
        assert_eq!(stats.segments, 1);
        assert!(stats.memory_bytes > 0);
        ptrvec_destroy(h);
    }

    #[test]
    fn stats_on_destroyed_handle() {
        let mut h = 0u64;
        ptrvec_create_rows(1, &mut h);
        ptrvec_destroy(h);
        let mut stats = PtrvecStats::default();
        assert_eq!(
            ptrvec_stats_get(h, &mut stats),
            PtrvecStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn stats_null_out_rejected() {
        assert_eq!(
            ptrvec_stats_get(0, std::ptr::null_mut()),
            PtrvecStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn to_rust_preserves_fields() {
        let stats = PtrvecStats {
            rows: 1,
            slots_used: 2,
            slots_reserved: 4,
            segments: 1,
            memory_bytes: 512,
        };
        let rust = stats.to_rust();
        assert_eq!(rust.rows, 1);
        assert_eq!(rust.slots_reserved, 4);
        assert_eq!(PtrvecStats::from_rust(&rust), stats);
    }
}
