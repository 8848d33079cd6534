/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::{c_char, c_void, CStr};

use gdbind::sys::{self, VariantType};

use super::{instance_id_of, record_bad_free, record_free, record_message, with_world, Call, FreeEvent, MessageLevel};
use super::{Value, ValueKind};

/// Lookup function handed to the entry point, like the engine's `get_proc_address`.
///
/// # Safety
/// `name` must be a valid C string.
pub unsafe extern "C" fn get_proc_address(name: *const c_char) -> sys::GDExtensionInterfaceFunctionPtr {
    macro_rules! lookup {
        ($name:expr; $( $function:ident ),* $(,)?) => {
            match $name {
                $(
                    stringify!($function) => {
                        let f = $function as *const ();
                        Some(std::mem::transmute::<*const (), unsafe extern "C" fn()>(f))
                    }
                )*
                _ => None,
            }
        };
    }

    let name = CStr::from_ptr(name).to_string_lossy();

    lookup!(name.as_ref();
        get_godot_version,
        print_error,
        print_warning,
        string_new_with_utf8_chars_and_len,
        string_to_utf8_chars,
        string_name_new_with_utf8_chars_and_len,
        variant_new_nil,
        variant_destroy,
        variant_get_type,
        variant_get_ptr_constructor,
        variant_get_ptr_destructor,
        classdb_construct_object,
        classdb_get_method_bind,
        classdb_get_class_tag,
        object_method_bind_ptrcall,
        object_destroy,
        object_get_instance_id,
        object_get_instance_from_id,
        object_cast_to,
    )
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Version and messages

unsafe extern "C" fn get_godot_version(r_version: *mut sys::GDExtensionGodotVersion) {
    *r_version = sys::GDExtensionGodotVersion {
        major: 4,
        minor: 3,
        patch: 0,
        string: c"Godot Engine v4.3.stable.mock".as_ptr(),
    };
}

unsafe extern "C" fn print_error(
    p_description: *const c_char,
    _p_function: *const c_char,
    _p_file: *const c_char,
    _p_line: i32,
    _p_editor_notify: sys::GDExtensionBool,
) {
    record_message(MessageLevel::Error, c_string(p_description));
}

unsafe extern "C" fn print_warning(
    p_description: *const c_char,
    _p_function: *const c_char,
    _p_file: *const c_char,
    _p_line: i32,
    _p_editor_notify: sys::GDExtensionBool,
) {
    record_message(MessageLevel::Warning, c_string(p_description));
}

unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Strings

unsafe fn utf8_from_raw(contents: *const c_char, len: sys::GDExtensionInt) -> String {
    if contents.is_null() || len <= 0 {
        return String::new();
    }

    let bytes = std::slice::from_raw_parts(contents as *const u8, len as usize);
    String::from_utf8_lossy(bytes).into_owned()
}

unsafe extern "C" fn string_new_with_utf8_chars_and_len(
    r_dest: sys::GDExtensionUninitializedStringPtr,
    p_contents: *const c_char,
    p_size: sys::GDExtensionInt,
) {
    let text = utf8_from_raw(p_contents, p_size);
    let id = with_world(|w| w.alloc_value(ValueKind::Builtin(VariantType::String), Value::Text(text)));
    *(r_dest as *mut u64) = id;
}

unsafe extern "C" fn string_to_utf8_chars(
    p_self: sys::GDExtensionConstStringPtr,
    r_text: *mut c_char,
    p_max_write_length: sys::GDExtensionInt,
) -> sys::GDExtensionInt {
    let id = *(p_self as *const u64);
    let text = with_world(|w| w.text(id));

    if !r_text.is_null() {
        let count = text.len().min(p_max_write_length.max(0) as usize);
        std::ptr::copy_nonoverlapping(text.as_ptr(), r_text as *mut u8, count);
    }

    text.len() as sys::GDExtensionInt
}

unsafe extern "C" fn string_name_new_with_utf8_chars_and_len(
    r_dest: sys::GDExtensionUninitializedStringNamePtr,
    p_contents: *const c_char,
    p_size: sys::GDExtensionInt,
) {
    let text = utf8_from_raw(p_contents, p_size);
    let id = with_world(|w| w.alloc_value(ValueKind::Builtin(VariantType::StringName), Value::Text(text)));
    *(r_dest as *mut u64) = id;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Variants

unsafe extern "C" fn variant_new_nil(r_dest: sys::GDExtensionUninitializedVariantPtr) {
    let id = with_world(|w| w.alloc_value(ValueKind::Variant, Value::Variant(VariantType::Nil, 0)));

    let words = r_dest as *mut u64;
    *words = VariantType::Nil.sys() as u64;
    *words.add(1) = id;
    *words.add(2) = 0;
}

unsafe extern "C" fn variant_destroy(p_self: sys::GDExtensionVariantPtr) {
    let id = *(p_self as *const u64).add(1);
    with_world(|w| w.free_value(id, ValueKind::Variant));
}

unsafe extern "C" fn variant_get_type(p_self: sys::GDExtensionConstVariantPtr) -> sys::GDExtensionVariantType {
    let words = p_self as *const u64;
    let id = *words.add(1);

    let stored = with_world(|w| match w.builtins.get(&id) {
        Some(super::StoredValue {
            value: Value::Variant(ty, _),
            ..
        }) => Some(*ty),
        _ => None,
    });

    stored.map_or(*words as sys::GDExtensionVariantType, VariantType::sys)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtin constructors and destructors

/// Index of the `String(StringName)` constructor.
const STRING_FROM_STRING_NAME: i32 = 2;

unsafe extern "C" fn construct_default<const TYPE: i32>(
    p_base: sys::GDExtensionUninitializedTypePtr,
    _p_args: *const sys::GDExtensionConstTypePtr,
) {
    let Some(ty) = VariantType::from_sys(TYPE) else {
        return;
    };

    let id = with_world(|w| w.alloc_default(ty));
    *(p_base as *mut u64) = id;
}

unsafe extern "C" fn string_from_string_name(
    p_base: sys::GDExtensionUninitializedTypePtr,
    p_args: *const sys::GDExtensionConstTypePtr,
) {
    let name_id = *(*p_args as *const u64);
    let id = with_world(|w| {
        let text = w.text(name_id);
        w.alloc_value(ValueKind::Builtin(VariantType::String), Value::Text(text))
    });

    *(p_base as *mut u64) = id;
}

unsafe extern "C" fn destroy<const TYPE: i32>(p_base: sys::GDExtensionTypePtr) {
    let Some(ty) = VariantType::from_sys(TYPE) else {
        return;
    };

    let id = *(p_base as *const u64);
    with_world(|w| w.free_value(id, ValueKind::Builtin(ty)));
}

/// Expands to a match from variant type ordinals to an instantiation of `$generic` for each type that owns engine memory.
macro_rules! per_owning_type {
    ($ordinal:expr, $generic:ident as $Fn:ty) => {
        match $ordinal {
            4 => Some($generic::<4> as $Fn),
            21 => Some($generic::<21> as $Fn),
            22 => Some($generic::<22> as $Fn),
            25 => Some($generic::<25> as $Fn),
            26 => Some($generic::<26> as $Fn),
            27 => Some($generic::<27> as $Fn),
            28 => Some($generic::<28> as $Fn),
            29 => Some($generic::<29> as $Fn),
            30 => Some($generic::<30> as $Fn),
            31 => Some($generic::<31> as $Fn),
            32 => Some($generic::<32> as $Fn),
            33 => Some($generic::<33> as $Fn),
            34 => Some($generic::<34> as $Fn),
            35 => Some($generic::<35> as $Fn),
            36 => Some($generic::<36> as $Fn),
            37 => Some($generic::<37> as $Fn),
            _ => None,
        }
    };
}

unsafe extern "C" fn variant_get_ptr_constructor(
    p_type: sys::GDExtensionVariantType,
    p_constructor: i32,
) -> sys::GDExtensionPtrConstructor {
    let string = VariantType::String.sys();

    match p_constructor {
        0 => per_owning_type!(p_type, construct_default as sys::BuiltinConstructor),
        STRING_FROM_STRING_NAME if p_type == string => Some(string_from_string_name as sys::BuiltinConstructor),
        _ => None,
    }
}

unsafe extern "C" fn variant_get_ptr_destructor(p_type: sys::GDExtensionVariantType) -> sys::GDExtensionPtrDestructor {
    per_owning_type!(p_type, destroy as sys::BuiltinDestructor)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// ClassDB

unsafe fn string_name_text(ptr: sys::GDExtensionConstStringNamePtr) -> String {
    let id = *(ptr as *const u64);
    with_world(|w| w.text(id))
}

unsafe extern "C" fn classdb_construct_object(p_classname: sys::GDExtensionConstStringNamePtr) -> sys::GDExtensionObjectPtr {
    let class_name = string_name_text(p_classname);

    with_world(|w| match w.construct(&class_name) {
        Some(instance_id) => w.object_ptr(instance_id),
        None => {
            record_message(MessageLevel::Error, format!("mock engine: cannot construct `{class_name}`"));
            std::ptr::null_mut()
        }
    })
}

unsafe extern "C" fn classdb_get_method_bind(
    p_classname: sys::GDExtensionConstStringNamePtr,
    p_methodname: sys::GDExtensionConstStringNamePtr,
    p_hash: sys::GDExtensionInt,
) -> sys::GDExtensionMethodBindPtr {
    let class_name = string_name_text(p_classname);
    let method_name = string_name_text(p_methodname);

    let bind = with_world(|w| w.method_bind(&class_name, &method_name, p_hash));
    bind as sys::GDExtensionMethodBindPtr
}

unsafe extern "C" fn classdb_get_class_tag(p_classname: sys::GDExtensionConstStringNamePtr) -> *mut c_void {
    let class_name = string_name_text(p_classname);
    with_world(|w| w.class_tag(&class_name)) as *mut c_void
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

unsafe extern "C" fn object_method_bind_ptrcall(
    p_method_bind: sys::GDExtensionMethodBindPtr,
    p_instance: sys::GDExtensionObjectPtr,
    p_args: *const sys::GDExtensionConstTypePtr,
    r_ret: sys::GDExtensionTypePtr,
) {
    let instance = if p_instance.is_null() {
        None
    } else {
        Some(instance_id_of(p_instance))
    };

    let call = Call {
        instance,
        args: p_args,
        ret: r_ret,
    };

    with_world(|w| {
        let Some(bind) = w.bind(p_method_bind as usize) else {
            record_message(MessageLevel::Error, "mock engine: invalid method bind".to_string());
            return;
        };

        let (class_name, method_name, func) = (bind.class_name, bind.method_name, bind.func);

        if let Some(instance_id) = instance {
            if !w.objects.contains_key(&instance_id) {
                record_message(
                    MessageLevel::Error,
                    format!("mock engine: {class_name}::{method_name} called on freed instance {instance_id}"),
                );
                return;
            }
        }

        func(w, &call);
    });
}

unsafe extern "C" fn object_destroy(p_o: sys::GDExtensionObjectPtr) {
    let instance_id = instance_id_of(p_o);

    with_world(|w| match w.objects.get(&instance_id) {
        Some(object) => {
            record_free(FreeEvent::Object(object.class_name.clone()));
            w.destroy_tree(instance_id);
        }
        None => record_bad_free(&format!("object {instance_id}")),
    });
}

unsafe extern "C" fn object_get_instance_id(p_object: sys::GDExtensionConstObjectPtr) -> sys::GDObjectInstanceID {
    instance_id_of(p_object)
}

unsafe extern "C" fn object_get_instance_from_id(p_instance_id: sys::GDObjectInstanceID) -> sys::GDExtensionObjectPtr {
    with_world(|w| w.object_ptr(p_instance_id))
}

unsafe extern "C" fn object_cast_to(
    p_object: sys::GDExtensionConstObjectPtr,
    p_class_tag: *mut c_void,
) -> sys::GDExtensionObjectPtr {
    let instance_id = instance_id_of(p_object);

    with_world(|w| {
        let target = w.class_by_tag(p_class_tag as usize);
        match target {
            Some(class_name) if w.is_instance_of(instance_id, &class_name) => w.object_ptr(instance_id),
            _ => std::ptr::null_mut(),
        }
    })
}
