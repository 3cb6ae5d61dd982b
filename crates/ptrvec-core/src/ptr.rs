//! Pointer-sized values and native addresses.
//!
//! Neither type is ever dereferenced by ptrvec. An [`OpaquePtr`] is the
//! element type stored in every row; an [`Address`] names a native
//! container on the far side of the bridge.

use std::fmt;

/// A pointer-sized value whose pointee is owned and typed by the caller.
///
/// Stored as an address with exposed provenance so that a pointer passed in
/// with [`from_ptr`](OpaquePtr::from_ptr) can be recovered intact with
/// [`as_ptr`](OpaquePtr::as_ptr).
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpaquePtr(usize);

impl OpaquePtr {
    /// The null pointer. New row slots are initialised to this value.
    pub const NULL: Self = Self(0);

    /// Build an opaque pointer from a raw address.
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// Capture a raw pointer. The pointee is not touched.
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.expose_provenance())
    }

    /// Capture a mutable raw pointer. The pointee is not touched.
    pub fn from_mut_ptr<T>(ptr: *mut T) -> Self {
        Self(ptr.expose_provenance())
    }

    /// The raw address.
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Whether this is the null pointer.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Recover a raw pointer. Dereferencing it is the caller's business.
    pub fn as_ptr<T>(self) -> *mut T {
        std::ptr::with_exposed_provenance_mut(self.0)
    }
}

impl fmt::Debug for OpaquePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaquePtr({:#x})", self.0)
    }
}

impl fmt::Display for OpaquePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for OpaquePtr {
    fn from(addr: usize) -> Self {
        Self(addr)
    }
}

/// Address of a native nested container, as issued by a [`NativeBridge`].
///
/// The value is opaque to the proxy. `Address::NULL` is never issued for a
/// live container, so a proxy holding it is always invalid.
///
/// [`NativeBridge`]: crate::NativeBridge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address(pub u64);

impl Address {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// Whether this is the null address.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
