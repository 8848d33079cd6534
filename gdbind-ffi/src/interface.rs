/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine interface table, loaded once through `get_proc_address`.
//!
//! Since Godot 4.2 the entry point does not receive a struct of function pointers anymore, but a lookup function. Each entry is
//! fetched by its C name; entries that the running engine does not provide remain `None` and are reported by
//! [`EngineInterface::missing_functions()`].

use std::ffi::{c_char, c_void};

use crate as sys;
use sys::{
    GDExtensionBool, GDExtensionConstObjectPtr, GDExtensionConstStringNamePtr,
    GDExtensionConstStringPtr, GDExtensionConstTypePtr, GDExtensionConstVariantPtr, GDExtensionGodotVersion,
    GDExtensionInt, GDExtensionMethodBindPtr, GDExtensionObjectPtr, GDExtensionPtrConstructor,
    GDExtensionPtrDestructor, GDExtensionTypePtr, GDExtensionUninitializedStringNamePtr,
    GDExtensionUninitializedStringPtr, GDExtensionUninitializedVariantPtr, GDExtensionVariantPtr,
    GDExtensionVariantType, GDObjectInstanceID,
};

macro_rules! engine_interface {
    (
        $(
            $( #[doc = $doc:literal] )*
            fn $name:ident ( $( $param:ident : $ParamTy:ty ),* $(,)? ) $( -> $Ret:ty )? ;
        )*
    ) => {
        /// Function pointers provided by the engine.
        ///
        /// Fields are `Option` because a lookup may fail on older engines. Access them through [`interface_fn!`](crate::interface_fn),
        /// which assumes presence.
        #[derive(Copy, Clone)]
        pub struct EngineInterface {
            $(
                $( #[doc = $doc] )*
                pub $name: Option<unsafe extern "C" fn( $( $param: $ParamTy ),* ) $( -> $Ret )?>,
            )*
        }

        impl EngineInterface {
            /// Looks up every function by name.
            ///
            /// # Safety
            /// `get_proc_address` must be the lookup function handed to the entry point. The returned pointers are trusted to
            /// have the signatures declared here.
            pub unsafe fn load(
                get_proc_address: unsafe extern "C" fn(*const c_char) -> sys::GDExtensionInterfaceFunctionPtr,
            ) -> Self {
                Self {
                    $(
                        $name: {
                            let name = concat!(stringify!($name), "\0");
                            let raw = get_proc_address(sys::c_str(name.as_bytes()));

                            // SAFETY: both types are `Option` of a function pointer, which have identical layout.
                            std::mem::transmute::<
                                sys::GDExtensionInterfaceFunctionPtr,
                                Option<unsafe extern "C" fn( $( $ParamTy ),* ) $( -> $Ret )?>,
                            >(raw)
                        },
                    )*
                }
            }

            /// Names of all functions the engine did not provide.
            pub fn missing_functions(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if self.$name.is_none() {
                        missing.push(stringify!($name));
                    }
                )*
                missing
            }
        }
    };
}

engine_interface! {
    fn get_godot_version(r_godot_version: *mut GDExtensionGodotVersion);

    fn print_error(
        p_description: *const c_char,
        p_function: *const c_char,
        p_file: *const c_char,
        p_line: i32,
        p_editor_notify: GDExtensionBool,
    );
    fn print_warning(
        p_description: *const c_char,
        p_function: *const c_char,
        p_file: *const c_char,
        p_line: i32,
        p_editor_notify: GDExtensionBool,
    );

    fn string_new_with_utf8_chars_and_len(
        r_dest: GDExtensionUninitializedStringPtr,
        p_contents: *const c_char,
        p_size: GDExtensionInt,
    );
    /// Returns the full length in bytes; writes at most `p_max_write_length` bytes, without null terminator.
    fn string_to_utf8_chars(
        p_self: GDExtensionConstStringPtr,
        r_text: *mut c_char,
        p_max_write_length: GDExtensionInt,
    ) -> GDExtensionInt;
    fn string_name_new_with_utf8_chars_and_len(
        r_dest: GDExtensionUninitializedStringNamePtr,
        p_contents: *const c_char,
        p_size: GDExtensionInt,
    );

    fn variant_new_nil(r_dest: GDExtensionUninitializedVariantPtr);
    fn variant_destroy(p_self: GDExtensionVariantPtr);
    fn variant_get_type(p_self: GDExtensionConstVariantPtr) -> GDExtensionVariantType;
    fn variant_get_ptr_constructor(
        p_type: GDExtensionVariantType,
        p_constructor: i32,
    ) -> GDExtensionPtrConstructor;
    fn variant_get_ptr_destructor(p_type: GDExtensionVariantType) -> GDExtensionPtrDestructor;

    fn classdb_construct_object(p_classname: GDExtensionConstStringNamePtr) -> GDExtensionObjectPtr;
    fn classdb_get_method_bind(
        p_classname: GDExtensionConstStringNamePtr,
        p_methodname: GDExtensionConstStringNamePtr,
        p_hash: GDExtensionInt,
    ) -> GDExtensionMethodBindPtr;
    fn classdb_get_class_tag(p_classname: GDExtensionConstStringNamePtr) -> *mut c_void;

    fn object_method_bind_ptrcall(
        p_method_bind: GDExtensionMethodBindPtr,
        p_instance: GDExtensionObjectPtr,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    );
    fn object_destroy(p_o: GDExtensionObjectPtr);
    fn object_get_instance_id(p_object: GDExtensionConstObjectPtr) -> GDObjectInstanceID;
    fn object_get_instance_from_id(p_instance_id: GDObjectInstanceID) -> GDExtensionObjectPtr;
    /// Returns null if the object does not inherit the class identified by the tag.
    fn object_cast_to(p_object: GDExtensionConstObjectPtr, p_class_tag: *mut c_void) -> GDExtensionObjectPtr;
}

/// Fetches the engine version through the interface.
///
/// # Safety
/// `interface.get_godot_version` must be a valid engine function.
pub unsafe fn read_godot_version(interface: &EngineInterface) -> Option<GodotVersion> {
    let get_godot_version = interface.get_godot_version?;

    let mut raw = GDExtensionGodotVersion {
        major: 0,
        minor: 0,
        patch: 0,
        string: std::ptr::null(),
    };
    get_godot_version(&mut raw);

    let full_string = if raw.string.is_null() {
        format!("{}.{}.{}", raw.major, raw.minor, raw.patch)
    } else {
        std::ffi::CStr::from_ptr(raw.string)
            .to_string_lossy()
            .into_owned()
    };

    Some(GodotVersion {
        major: raw.major,
        minor: raw.minor,
        patch: raw.patch,
        full_string,
    })
}

/// Engine version reported at load time.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GodotVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub full_string: String,
}

impl std::fmt::Display for GodotVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_string)
    }
}
