/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use gdbind_ffi as sys;
use sys::{VariantType, HANDLE_WORDS};

use crate::obj::ObjectHandle;

/// Kind of engine value behind an [`ErasedHandle`].
///
/// Determines both the size of the handle and how it is released.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HandleKind {
    String,
    StringName,
    Array,
    Dictionary,
    PackedByteArray,
    PackedInt32Array,
    PackedInt64Array,
    PackedFloat32Array,
    PackedFloat64Array,
    PackedStringArray,
    PackedVector2Array,
    PackedVector3Array,
    PackedColorArray,
    Variant,
    Object,
}

impl HandleKind {
    /// Builtin type whose destructor releases this kind, or `None` for variants and objects.
    pub fn builtin_type(self) -> Option<VariantType> {
        let ty = match self {
            Self::String => VariantType::String,
            Self::StringName => VariantType::StringName,
            Self::Array => VariantType::Array,
            Self::Dictionary => VariantType::Dictionary,
            Self::PackedByteArray => VariantType::PackedByteArray,
            Self::PackedInt32Array => VariantType::PackedInt32Array,
            Self::PackedInt64Array => VariantType::PackedInt64Array,
            Self::PackedFloat32Array => VariantType::PackedFloat32Array,
            Self::PackedFloat64Array => VariantType::PackedFloat64Array,
            Self::PackedStringArray => VariantType::PackedStringArray,
            Self::PackedVector2Array => VariantType::PackedVector2Array,
            Self::PackedVector3Array => VariantType::PackedVector3Array,
            Self::PackedColorArray => VariantType::PackedColorArray,
            Self::Variant | Self::Object => return None,
        };

        Some(ty)
    }

    /// Number of bytes the engine reads and writes for a value of this kind.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::String | Self::StringName | Self::Array | Self::Dictionary => 8,
            Self::Variant => 24,
            // Object handles carry the instance ID and class next to the pointer; the engine only sees the first word.
            Self::Object => 8,
            _ => 16,
        }
    }
}

/// Type-erased engine handle: the raw words of a builtin value, a variant, or an object pointer.
///
/// This is what the lifetime registry stores. An `ErasedHandle` stands for ownership of the engine value, so it is move-only:
/// registering it, handing it to the engine, or releasing it consumes it. Code that only needs to look at the value uses the
/// [`HandleBits`] view.
///
/// A handle cannot be registered twice:
/// ```compile_fail
/// # use gdbind_core::lifetime::{ErasedHandle, Scope};
/// fn register_twice(handle: ErasedHandle, scope: Scope) {
///     scope.register(handle);
///     scope.register(handle);
/// }
/// ```
#[derive(Eq, PartialEq, Hash)]
pub struct ErasedHandle {
    kind: HandleKind,
    words: [u64; HANDLE_WORDS],
}

impl ErasedHandle {
    /// Takes ownership of an engine value, given by its raw words.
    ///
    /// # Safety
    /// The caller must own the value behind `words` (e.g. it was just created or returned with ownership), and no other
    /// `ErasedHandle` for the same value may exist.
    pub unsafe fn new(kind: HandleKind, words: [u64; HANDLE_WORDS]) -> Self {
        Self { kind, words }
    }

    /// Takes ownership of an opaque builtin value.
    ///
    /// # Safety
    /// See [`new()`](Self::new).
    pub unsafe fn from_opaque<const N: usize>(kind: HandleKind, opaque: &sys::Opaque<N>) -> Self {
        debug_assert!(N <= HANDLE_WORDS * 8);
        Self::new(kind, opaque.to_handle_words())
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn words(&self) -> &[u64; HANDLE_WORDS] {
        &self.words
    }

    /// Non-owning view of the raw words.
    pub fn bits(&self) -> HandleBits {
        HandleBits {
            kind: self.kind,
            words: self.words,
        }
    }

    /// Frees the engine memory behind this handle.
    ///
    /// # Safety
    /// - The binding must be initialized.
    /// - The handle must be valid and owned by the caller; no copy of it may be used or released afterwards.
    pub unsafe fn release(self) {
        sys::out!("release {self:?}");

        match self.kind {
            HandleKind::Object => ObjectHandle::from_erased(self).release(),
            HandleKind::Variant => {
                let mut value: sys::OpaqueVariant = self.bits().to_opaque();
                sys::interface_fn!(variant_destroy)(value.as_mut_ptr());
            }
            kind => {
                // Kinds other than Variant and Object always map to a builtin type.
                let Some(ty) = kind.builtin_type() else {
                    unreachable!("builtin handle kind without variant type: {kind:?}")
                };

                let destructor = sys::builtin_lifecycle_api().destructor(ty);
                let mut value: sys::Opaque<24> = self.bits().to_opaque();
                destructor(value.as_mut_ptr());
            }
        }
    }
}

impl fmt::Debug for ErasedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            HandleKind::Object => write!(f, "ErasedHandle(Object, {:#x}, id {:#x})", self.words[0], self.words[1]),
            kind => write!(f, "ErasedHandle({kind:?}, {:#x})", self.words[0]),
        }
    }
}

/// Copy of a handle's raw words, without ownership.
///
/// Used to pass a value's address to the engine or to inspect it. A `HandleBits` can never be registered or released.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct HandleBits {
    kind: HandleKind,
    words: [u64; HANDLE_WORDS],
}

impl HandleBits {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn words(&self) -> &[u64; HANDLE_WORDS] {
        &self.words
    }

    /// Bitwise copy of the value, to pass its address to the engine.
    pub fn to_opaque<const N: usize>(&self) -> sys::Opaque<N> {
        sys::Opaque::from_handle_words(&self.words)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_sizes_fit_words() {
        let kinds = [
            HandleKind::String,
            HandleKind::PackedVector3Array,
            HandleKind::Variant,
            HandleKind::Object,
        ];

        for kind in kinds {
            assert!(kind.size_bytes() <= HANDLE_WORDS * 8, "{kind:?}");
        }
    }

    #[test]
    fn builtin_types_have_destructors() {
        for kind in [HandleKind::String, HandleKind::Dictionary, HandleKind::PackedColorArray] {
            let ty = kind.builtin_type().expect("builtin kind");
            assert!(ty.needs_destructor());
        }

        assert_eq!(HandleKind::Variant.builtin_type(), None);
        assert_eq!(HandleKind::Object.builtin_type(), None);
    }

    #[test]
    fn opaque_roundtrip_keeps_words() {
        // SAFETY: test values never reach the engine.
        let handle = unsafe { ErasedHandle::new(HandleKind::PackedByteArray, [0xdead, 0xbeef, 0]) };
        let opaque: sys::OpaquePackedArray = handle.bits().to_opaque();

        let back = unsafe { ErasedHandle::from_opaque(HandleKind::PackedByteArray, &opaque) };
        assert_eq!(back.bits(), handle.bits());
    }
}
