//! Segment-backed row storage for ptrvec native containers.
//!
//! This is the native side of a nested pointer container: the object a
//! bridge address resolves to. Instead of a vector of heap-allocated
//! vectors, rows are described by a flat table of [`RowDescriptor`]s that
//! point into bump-allocated segments of pointer-sized slots.
//!
//! # Architecture
//!
//! ```text
//! RowStore (one per native container)
//! ├── Vec<RowDescriptor>   outer sequence: (segment, offset, len, capacity)
//! ├── SegmentList → Segment[] (Vec<OpaquePtr>, bump-allocated)
//! └── retired ranges       capacity class → freed (segment, offset) pairs
//! ```
//!
//! # Row capacity
//!
//! Row capacities are rounded up to a power of two (minimum
//! [`MIN_ROW_CAPACITY`](store::MIN_ROW_CAPACITY)). A row that outgrows its
//! capacity moves to a fresh range and its old range is retired; retired
//! ranges are reused exactly by capacity class, so repeated grow/shrink
//! cycles do not fragment the segments.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod segment;
pub mod store;

pub use config::ArenaConfig;
pub use descriptor::RowDescriptor;
pub use error::ArenaError;
pub use store::RowStore;
