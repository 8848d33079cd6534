/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Packed arrays occupy two words (data pointer and proxy), and are copy-on-write in the engine.

macro_rules! impl_packed_array {
    ($($Type:ident => $Element:literal;)+) => {
        $(
            impl_managed_builtin! {
                #[doc = concat!("Packed array of ", $Element, " elements, stored contiguously in the engine.")]
                pub struct $Type => $Type;
            }
        )+
    };
}

impl_packed_array! {
    PackedByteArray => "`u8`";
    PackedInt32Array => "`i32`";
    PackedInt64Array => "`i64`";
    PackedFloat32Array => "`f32`";
    PackedFloat64Array => "`f64`";
    PackedStringArray => "`GString`";
    PackedVector2Array => "`Vector2`";
    PackedVector3Array => "`Vector3`";
    PackedColorArray => "`Color`";
}
