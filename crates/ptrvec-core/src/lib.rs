//! Core types for ptrvec.
//!
//! Defines the vocabulary shared by every ptrvec crate: opaque pointer
//! values ([`OpaquePtr`]), native container addresses ([`Address`]), the
//! error type surfaced to callers ([`ContainerError`]) and the single
//! capability interface the proxy is built on ([`NativeBridge`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod error;
pub mod ptr;

pub use bridge::{ContainerStats, NativeBridge};
pub use error::ContainerError;
pub use ptr::{Address, OpaquePtr};
