//! ptrvec: a Rust proxy for a native `vector<vector<void*>>`.
//!
//! [`NestedPointerContainer`] stands in for a two-level container of opaque
//! pointers that lives on the native side of a call bridge. The proxy holds
//! only the container's [`Address`] and an ownership flag; every length and
//! element is read from native state on demand, and no row is copied across
//! the boundary unless asked for.
//!
//! # Quick start
//!
//! ```rust
//! use ptrvec::{NestedPointerContainer, OpaquePtr};
//!
//! let mut rows = NestedPointerContainer::with_rows(3).unwrap();
//! rows.resize_row(1, 5).unwrap();
//! rows.set(1, 4, OpaquePtr::from_addr(0x1000)).unwrap();
//!
//! assert_eq!(rows.len().unwrap(), 3);
//! assert_eq!(rows.row_len(1).unwrap(), 5);
//! assert_eq!(rows.get(1, 4).unwrap(), OpaquePtr::from_addr(0x1000));
//! assert!(rows.get(1, 0).unwrap().is_null());
//! ```
//!
//! # Ownership
//!
//! Proxies created with [`NestedPointerContainer::new`],
//! [`with_rows`](NestedPointerContainer::with_rows) or
//! [`from_rows`](NestedPointerContainer::from_rows) own their native object
//! and release it on drop. [`wrap`](NestedPointerContainer::wrap) builds a
//! non-owning view over an address someone else owns. Opaque pointer values
//! are never dereferenced or released by this crate.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`container`] | The proxy and its lifecycle |
//! | [`row`] | Borrowed row views |
//! | [`bridge`] | [`FfiBridge`], the C ABI implementation of [`NativeBridge`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod container;
pub mod row;

pub use bridge::FfiBridge;
pub use container::NestedPointerContainer;
pub use row::{RowView, RowViewMut};

pub use ptrvec_arena::ArenaConfig;
pub use ptrvec_core::{Address, ContainerError, ContainerStats, NativeBridge, OpaquePtr};
