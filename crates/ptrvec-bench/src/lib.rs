//! Benchmark profiles for ptrvec containers.
//!
//! - [`square_profile`]: `n` rows of `n` pointers each
//! - [`ragged_profile`]: row lengths cycling through a fixed pattern

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ptrvec_core::OpaquePtr;

/// Row lengths used by [`ragged_profile`], repeated as needed.
const RAGGED_LENS: [usize; 8] = [0, 1, 3, 4, 7, 16, 33, 2];

/// Deterministic, non-null, pointer-aligned fake pointer for cell (`row`, `col`).
pub fn fake_ptr(row: usize, col: usize) -> OpaquePtr {
    OpaquePtr::from_addr(((row << 20) | col).wrapping_add(1) << 3)
}

/// `n` rows of `n` pointers each.
pub fn square_profile(n: usize) -> Vec<Vec<OpaquePtr>> {
    (0..n)
        .map(|i| (0..n).map(|j| fake_ptr(i, j)).collect())
        .collect()
}

/// `rows` rows with lengths cycling through a fixed ragged pattern.
pub fn ragged_profile(rows: usize) -> Vec<Vec<OpaquePtr>> {
    (0..rows)
        .map(|i| {
            let len = RAGGED_LENS[i % RAGGED_LENS.len()];
            (0..len).map(|j| fake_ptr(i, j)).collect()
        })
        .collect()
}
