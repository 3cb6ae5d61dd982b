//! Errors surfaced by a nested pointer container proxy.
//!
//! Allocation, indexing and lifetime failures each get their own variant so
//! callers can retry, re-check bounds or treat the failure as a bug.

use std::error::Error;
use std::fmt;

use crate::ptr::Address;

/// Errors from operations on a nested pointer container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// The native side could not satisfy an allocation, either because a
    /// configured limit was reached or the system allocator refused.
    AllocationFailed,
    /// A row or column index was outside the container's current bounds.
    IndexOutOfBounds {
        /// The row index that was requested.
        row: usize,
        /// The column index, for element operations.
        column: Option<usize>,
    },
    /// The proxy holds a null, released or stale address.
    InvalidState {
        /// The address the operation was attempted on.
        address: Address,
    },
    /// A caller-provided buffer is shorter than the row being read.
    BufferTooSmall {
        /// Number of slots the row holds.
        needed: usize,
        /// Number of slots the buffer holds.
        capacity: usize,
    },
    /// The bridge failed for a reason of its own (caught panic, poisoned
    /// lock, rejected argument).
    Bridge {
        /// Raw status code reported by the bridge.
        status: i32,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed => write!(f, "native allocation failed"),
            Self::IndexOutOfBounds {
                row,
                column: Some(column),
            } => write!(f, "index ({row}, {column}) out of bounds"),
            Self::IndexOutOfBounds { row, column: None } => {
                write!(f, "row index {row} out of bounds")
            }
            Self::InvalidState { address } => {
                write!(f, "container at {address} is null, released or stale")
            }
            Self::BufferTooSmall { needed, capacity } => {
                write!(
                    f,
                    "buffer too small: row holds {needed} slots, buffer holds {capacity}"
                )
            }
            Self::Bridge { status } => write!(f, "native bridge failed with status {status}"),
        }
    }
}

impl Error for ContainerError {}
