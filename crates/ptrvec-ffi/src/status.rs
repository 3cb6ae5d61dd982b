//! C-compatible status codes.
//!
//! [`PtrvecStatus`] is a `repr(i32)` enum covering every failure an entry
//! point can report. `Ok` is 0; all errors are negative and ABI-stable.

use ptrvec_arena::ArenaError;

/// C-compatible status code returned by all FFI functions.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PtrvecStatus {
    /// Success.
    Ok = 0,
    /// Handle is null, was never issued, or was already destroyed.
    InvalidHandle = -1,
    /// Storage could not be allocated (limit reached or allocator refused).
    AllocationFailed = -2,
    /// A row or column index is out of bounds.
    IndexOutOfBounds = -3,
    /// A pointer argument is null or a parameter is unusable.
    InvalidArgument = -4,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -5,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -6,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl PtrvecStatus {
    /// Decode a raw status code. Returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            -1 => Self::InvalidHandle,
            -2 => Self::AllocationFailed,
            -3 => Self::IndexOutOfBounds,
            -4 => Self::InvalidArgument,
            -5 => Self::BufferTooSmall,
            -6 => Self::InternalError,
            -128 => Self::Panicked,
            _ => return None,
        })
    }
}

impl From<&ArenaError> for PtrvecStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::CapacityExceeded { .. } | ArenaError::OutOfMemory { .. } => {
                PtrvecStatus::AllocationFailed
            }
            ArenaError::RowOutOfBounds { .. } | ArenaError::ColumnOutOfBounds { .. } => {
                PtrvecStatus::IndexOutOfBounds
            }
            ArenaError::InvalidConfig { .. } => PtrvecStatus::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(PtrvecStatus::Ok as i32, 0);
        assert_eq!(PtrvecStatus::InvalidHandle as i32, -1);
        assert_eq!(PtrvecStatus::AllocationFailed as i32, -2);
        assert_eq!(PtrvecStatus::IndexOutOfBounds as i32, -3);
        assert_eq!(PtrvecStatus::InvalidArgument as i32, -4);
        assert_eq!(PtrvecStatus::BufferTooSmall as i32, -5);
        assert_eq!(PtrvecStatus::InternalError as i32, -6);
        assert_eq!(PtrvecStatus::Panicked as i32, -128);
    }

    #[test]
    fn from_code_round_trips_known_codes() {
        for status in [
            PtrvecStatus::Ok,
            PtrvecStatus::InvalidHandle,
            PtrvecStatus::AllocationFailed,
            PtrvecStatus::IndexOutOfBounds,
            PtrvecStatus::InvalidArgument,
            PtrvecStatus::BufferTooSmall,
            PtrvecStatus::InternalError,
            PtrvecStatus::Panicked,
        ] {
            assert_eq!(PtrvecStatus::from_code(status as i32), Some(status));
        }
        assert_eq!(PtrvecStatus::from_code(-77), None);
    }

    #[test]
    fn arena_error_to_status() {
        assert_eq!(
            PtrvecStatus::from(&ArenaError::CapacityExceeded {
                requested: 2,
                capacity: 1
            }),
            PtrvecStatus::AllocationFailed
        );
        assert_eq!(
            PtrvecStatus::from(&ArenaError::OutOfMemory { requested: 1 }),
            PtrvecStatus::AllocationFailed
        );
        assert_eq!(
            PtrvecStatus::from(&ArenaError::RowOutOfBounds { row: 1, rows: 0 }),
            PtrvecStatus::IndexOutOfBounds
        );
        assert_eq!(
            PtrvecStatus::from(&ArenaError::ColumnOutOfBounds {
                row: 0,
                column: 1,
                len: 0
            }),
            PtrvecStatus::IndexOutOfBounds
        );
        assert_eq!(
            PtrvecStatus::from(&ArenaError::InvalidConfig { reason: "x".into() }),
            PtrvecStatus::InvalidArgument
        );
    }
}
