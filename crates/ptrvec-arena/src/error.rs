//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during row storage operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A configured limit (segments, rows, row length) would be exceeded.
    CapacityExceeded {
        /// Quantity requested.
        requested: usize,
        /// Limit in force.
        capacity: usize,
    },
    /// The system allocator refused to reserve backing storage.
    OutOfMemory {
        /// Number of slots or descriptors requested.
        requested: usize,
    },
    /// A row index past the end of the outer sequence.
    RowOutOfBounds {
        /// The requested row.
        row: usize,
        /// Current number of rows.
        rows: usize,
    },
    /// A column index past the end of a row.
    ColumnOutOfBounds {
        /// The row addressed.
        row: usize,
        /// The requested column.
        column: usize,
        /// Current length of the row.
        len: usize,
    },
    /// A configuration parameter is unusable.
    InvalidConfig {
        /// Human-readable reason.
        reason: String,
    },
}

impl ArenaError {
    /// Whether this error reports an out-of-bounds index.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            Self::RowOutOfBounds { .. } | Self::ColumnOutOfBounds { .. }
        )
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested}, limit {capacity}"
                )
            }
            Self::OutOfMemory { requested } => {
                write!(f, "allocator refused reservation of {requested} entries")
            }
            Self::RowOutOfBounds { row, rows } => {
                write!(f, "row {row} out of bounds for {rows} rows")
            }
            Self::ColumnOutOfBounds { row, column, len } => {
                write!(f, "column {column} out of bounds for row {row} of length {len}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
