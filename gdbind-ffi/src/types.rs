/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! C types of the GDExtension interface, as far as the marshaling layer needs them.
//!
//! Names follow `gdextension_interface.h` so that signatures can be compared against the header line by line.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_void};

use crate::opaque::Opaque;

pub type GDExtensionInt = i64;
pub type GDExtensionBool = u8;
pub type GDObjectInstanceID = u64;

pub type GDExtensionVariantPtr = *mut c_void;
pub type GDExtensionConstVariantPtr = *const c_void;
pub type GDExtensionUninitializedVariantPtr = *mut c_void;
pub type GDExtensionStringNamePtr = *mut c_void;
pub type GDExtensionConstStringNamePtr = *const c_void;
pub type GDExtensionUninitializedStringNamePtr = *mut c_void;
pub type GDExtensionStringPtr = *mut c_void;
pub type GDExtensionConstStringPtr = *const c_void;
pub type GDExtensionUninitializedStringPtr = *mut c_void;
pub type GDExtensionObjectPtr = *mut c_void;
pub type GDExtensionConstObjectPtr = *const c_void;
pub type GDExtensionTypePtr = *mut c_void;
pub type GDExtensionConstTypePtr = *const c_void;
pub type GDExtensionUninitializedTypePtr = *mut c_void;
pub type GDExtensionMethodBindPtr = *const c_void;
pub type GDExtensionClassLibraryPtr = *mut c_void;
pub type GDExtensionClassInstancePtr = *mut c_void;

pub type GDExtensionVariantType = i32;
pub type GDExtensionInitializationLevel = u32;

pub const GDEXTENSION_INITIALIZATION_CORE: GDExtensionInitializationLevel = 0;
pub const GDEXTENSION_INITIALIZATION_SERVERS: GDExtensionInitializationLevel = 1;
pub const GDEXTENSION_INITIALIZATION_SCENE: GDExtensionInitializationLevel = 2;
pub const GDEXTENSION_INITIALIZATION_EDITOR: GDExtensionInitializationLevel = 3;

pub type GDExtensionInterfaceFunctionPtr = Option<unsafe extern "C" fn()>;
pub type GDExtensionInterfaceGetProcAddress =
    Option<unsafe extern "C" fn(p_function_name: *const c_char) -> GDExtensionInterfaceFunctionPtr>;

pub type GDExtensionPtrConstructor = Option<
    unsafe extern "C" fn(p_base: GDExtensionUninitializedTypePtr, p_args: *const GDExtensionConstTypePtr),
>;
pub type GDExtensionPtrDestructor = Option<unsafe extern "C" fn(p_base: GDExtensionTypePtr)>;

/// Ptrcall-shaped virtual method, as handed to the engine by `get_virtual`.
pub type GDExtensionClassCallVirtual = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GDExtensionGodotVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub string: *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GDExtensionInitialization {
    pub minimum_initialization_level: GDExtensionInitializationLevel,
    pub userdata: *mut c_void,
    pub initialize:
        Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>,
    pub deinitialize:
        Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>,
}

/// Signature of the entry point symbol that the engine looks up in the dynamic library.
pub type GDExtensionInitializationFunction = unsafe extern "C" fn(
    p_get_proc_address: GDExtensionInterfaceGetProcAddress,
    p_library: GDExtensionClassLibraryPtr,
    r_initialization: *mut GDExtensionInitialization,
) -> GDExtensionBool;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Opaque builtin storage

// Sizes for a 64-bit engine built with single-precision floats.
pub type OpaqueString = Opaque<8>;
pub type OpaqueStringName = Opaque<8>;
pub type OpaqueArray = Opaque<8>;
pub type OpaqueDictionary = Opaque<8>;
pub type OpaquePackedArray = Opaque<16>;
pub type OpaqueVariant = Opaque<24>;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Variant types

/// Variant type ordinals, as used by `variant_get_ptr_destructor()` and friends.
#[repr(i32)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum VariantType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Vector2 = 5,
    Vector2i = 6,
    Rect2 = 7,
    Rect2i = 8,
    Vector3 = 9,
    Vector3i = 10,
    Transform2D = 11,
    Vector4 = 12,
    Vector4i = 13,
    Plane = 14,
    Quaternion = 15,
    Aabb = 16,
    Basis = 17,
    Transform3D = 18,
    Projection = 19,
    Color = 20,
    StringName = 21,
    NodePath = 22,
    Rid = 23,
    Object = 24,
    Callable = 25,
    Signal = 26,
    Dictionary = 27,
    Array = 28,
    PackedByteArray = 29,
    PackedInt32Array = 30,
    PackedInt64Array = 31,
    PackedFloat32Array = 32,
    PackedFloat64Array = 33,
    PackedStringArray = 34,
    PackedVector2Array = 35,
    PackedVector3Array = 36,
    PackedColorArray = 37,
}

impl VariantType {
    /// Number of variant types known to this binding.
    pub const COUNT: usize = 38;

    pub fn sys(self) -> GDExtensionVariantType {
        self as GDExtensionVariantType
    }

    /// Index into per-type tables; stable for the lifetime of the process.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_sys(sys: GDExtensionVariantType) -> Option<Self> {
        use VariantType as V;

        let ty = match sys {
            0 => V::Nil,
            1 => V::Bool,
            2 => V::Int,
            3 => V::Float,
            4 => V::String,
            5 => V::Vector2,
            6 => V::Vector2i,
            7 => V::Rect2,
            8 => V::Rect2i,
            9 => V::Vector3,
            10 => V::Vector3i,
            11 => V::Transform2D,
            12 => V::Vector4,
            13 => V::Vector4i,
            14 => V::Plane,
            15 => V::Quaternion,
            16 => V::Aabb,
            17 => V::Basis,
            18 => V::Transform3D,
            19 => V::Projection,
            20 => V::Color,
            21 => V::StringName,
            22 => V::NodePath,
            23 => V::Rid,
            24 => V::Object,
            25 => V::Callable,
            26 => V::Signal,
            27 => V::Dictionary,
            28 => V::Array,
            29 => V::PackedByteArray,
            30 => V::PackedInt32Array,
            31 => V::PackedInt64Array,
            32 => V::PackedFloat32Array,
            33 => V::PackedFloat64Array,
            34 => V::PackedStringArray,
            35 => V::PackedVector2Array,
            36 => V::PackedVector3Array,
            37 => V::PackedColorArray,
            _ => return None,
        };

        Some(ty)
    }

    /// Whether values of this type own engine memory and therefore need a destructor call.
    pub fn needs_destructor(self) -> bool {
        use VariantType as V;

        matches!(
            self,
            V::String
                | V::StringName
                | V::NodePath
                | V::Callable
                | V::Signal
                | V::Dictionary
                | V::Array
                | V::PackedByteArray
                | V::PackedInt32Array
                | V::PackedInt64Array
                | V::PackedFloat32Array
                | V::PackedFloat64Array
                | V::PackedStringArray
                | V::PackedVector2Array
                | V::PackedVector3Array
                | V::PackedColorArray
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_type_sys_roundtrip_covers_all() {
        for ord in 0..VariantType::COUNT as i32 {
            let ty = VariantType::from_sys(ord).expect("ordinal in range");
            assert_eq!(ty.sys(), ord);
        }

        assert_eq!(VariantType::from_sys(VariantType::COUNT as i32), None);
        assert_eq!(VariantType::from_sys(-1), None);
    }

    #[test]
    fn plain_types_need_no_destructor() {
        assert!(!VariantType::Int.needs_destructor());
        assert!(!VariantType::Vector3.needs_destructor());
        assert!(!VariantType::Object.needs_destructor());
        assert!(VariantType::String.needs_destructor());
        assert!(VariantType::PackedColorArray.needs_destructor());
    }
}
