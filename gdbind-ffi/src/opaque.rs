/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Maximum number of 64-bit words an engine handle occupies (`Variant` on 64-bit builds).
pub const HANDLE_WORDS: usize = 3;

/// Stores an opaque engine value of a certain size, with very restricted operations.
///
/// Due to `align(8)` and not `packed` repr, this type may be bigger than `N` bytes, which is fine since the engine only reads and
/// writes those `N` bytes.
#[repr(C, align(8))]
#[derive(Copy, Clone)]
pub struct Opaque<const N: usize> {
    storage: [u8; N],
    marker: std::marker::PhantomData<*const u8>, // disable Send/Sync
}

impl<const N: usize> Opaque<N> {
    pub const SIZE: usize = N;

    /// Zero-filled storage, to be passed to an engine constructor as uninitialized destination.
    pub const fn zeroed() -> Self {
        Self {
            storage: [0; N],
            marker: std::marker::PhantomData,
        }
    }

    /// Packs the bytes into handle words; unused trailing words stay zero.
    pub fn to_handle_words(&self) -> [u64; HANDLE_WORDS] {
        const { assert!(N <= HANDLE_WORDS * 8, "opaque value too large for a handle") };

        let mut words = [0u64; HANDLE_WORDS];

        // SAFETY: both regions are valid for N bytes (checked above) and do not overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(
                self.storage.as_ptr(),
                words.as_mut_ptr().cast::<u8>(),
                N,
            );
        }

        words
    }

    /// Inverse of [`to_handle_words()`](Self::to_handle_words).
    pub fn from_handle_words(words: &[u64; HANDLE_WORDS]) -> Self {
        const { assert!(N <= HANDLE_WORDS * 8, "opaque value too large for a handle") };

        let mut opaque = Self::zeroed();

        // SAFETY: see to_handle_words().
        unsafe {
            std::ptr::copy_nonoverlapping(
                words.as_ptr().cast::<u8>(),
                opaque.storage.as_mut_ptr(),
                N,
            );
        }

        opaque
    }

    pub fn as_mut_ptr(&mut self) -> *mut std::ffi::c_void {
        self.storage.as_mut_ptr().cast()
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_void {
        self.storage.as_ptr().cast()
    }
}

impl<const N: usize> std::fmt::Debug for Opaque<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Opaque<{N}>({:02x?})", &self.storage)
    }
}
