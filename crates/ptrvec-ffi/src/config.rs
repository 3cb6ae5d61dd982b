//! C mirror of the arena configuration.

use ptrvec_arena::ArenaConfig;

use crate::status::PtrvecStatus;

/// Storage limits for a native container, passed to
/// `ptrvec_create_with_config`.
///
/// Obtain defaults with [`ptrvec_arena_config_default`] and adjust fields
/// before use.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PtrvecArenaConfig {
    /// Slots per regular segment. At least 64.
    pub segment_slots: u32,
    /// Maximum number of segments. Between 1 and 65535.
    pub max_segments: u32,
    /// Maximum number of rows.
    pub max_rows: u32,
}

const _: () = assert!(std::mem::size_of::<PtrvecArenaConfig>() == 12);

impl PtrvecArenaConfig {
    /// Convert to an [`ArenaConfig`], rejecting out-of-range values.
    pub fn to_arena(&self) -> Option<ArenaConfig> {
        let config = ArenaConfig {
            segment_slots: self.segment_slots,
            max_segments: u16::try_from(self.max_segments).ok()?,
            max_rows: self.max_rows,
        };
        config.validate().ok()?;
        Some(config)
    }
}

impl From<&ArenaConfig> for PtrvecArenaConfig {
    fn from(config: &ArenaConfig) -> Self {
        Self {
            segment_slots: config.segment_slots,
            max_segments: config.max_segments as u32,
            max_rows: config.max_rows,
        }
    }
}

impl Default for PtrvecArenaConfig {
    fn default() -> Self {
        Self::from(&ArenaConfig::default())
    }
}

/// Write the default arena configuration to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ptrvec_arena_config_default(out: *mut PtrvecArenaConfig) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return PtrvecStatus::InvalidArgument as i32;
        }
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = PtrvecArenaConfig::default() };
        PtrvecStatus::Ok as i32
    })
}
