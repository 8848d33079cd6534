/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Built-in types like `Vector2`, `GString` and `Variant`.
//!
//! There are two families:
//! - **Plain values** (`Vector2`, `Vector3`, `Rect2`, `Color`) are re-implemented in Rust and copied bitwise into call frames.
//! - **Managed values** (`GString`, `StringName`, `Array`, `Dictionary`, packed arrays, `Variant`) own engine memory. The Rust
//!   value is only a key into a [`Scope`][crate::lifetime::Scope]; the engine memory is freed when that scope ends.

mod macros;

mod collections;
mod color;
mod packed_array;
mod rect2;
mod string;
mod string_name;
mod variant;
mod vectors;

#[path = "real.rs"]
mod real_inner;

use std::ptr;

use gdbind_ffi as sys;

pub use collections::{Array, Dictionary};
pub use color::Color;
pub use packed_array::{
    PackedByteArray, PackedColorArray, PackedFloat32Array, PackedFloat64Array, PackedInt32Array, PackedInt64Array,
    PackedStringArray, PackedVector2Array, PackedVector3Array,
};
pub use real_inner::real;
pub use rect2::Rect2;
pub use string::GString;
pub use string_name::StringName;
pub use sys::VariantType;
pub use variant::Variant;
pub use vectors::{Vector2, Vector3};

use crate::lifetime::{ErasedHandle, HandleKind};
use crate::meta::Slot;

/// Default-constructs a builtin value.
///
/// # Safety
/// The binding must be initialized.
pub(crate) unsafe fn new_default_handle(kind: HandleKind) -> ErasedHandle {
    let mut slot: Slot = Default::default();
    prepare_builtin_slot(&mut slot, kind);

    ErasedHandle::new(kind, crate::meta::handle_words(&slot))
}

/// Initializes a return slot, since the engine assigns builtin returns into existing values.
///
/// # Safety
/// The binding must be initialized, and `slot` must not hold a live value.
pub(crate) unsafe fn prepare_builtin_slot(slot: &mut Slot, kind: HandleKind) {
    let out = slot.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr;

    match kind.builtin_type() {
        Some(ty) => sys::builtin_lifecycle_api().default_constructor(ty)(out, ptr::null()),
        None => {
            debug_assert_eq!(kind, HandleKind::Variant, "objects are not builtin values");
            sys::interface_fn!(variant_new_nil)(out);
        }
    }
}

#[cfg(all(test, feature = "serde"))]
pub(crate) mod test_utils {
    use serde::{Deserialize, Serialize};

    pub(crate) fn roundtrip<T>(value: &T, expected_json: &str)
    where
        T: for<'a> Deserialize<'a> + Serialize + PartialEq + std::fmt::Debug,
    {
        let json: String = serde_json::to_string(value).unwrap();
        let back: T = serde_json::from_str(json.as_str()).unwrap();

        assert_eq!(back, *value, "serde round-trip changes value");
        assert_eq!(json, expected_json, "value does not conform to expected JSON");
    }
}
