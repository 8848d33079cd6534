/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Functions and macros that are not very specific to the marshaling layer, but come in handy.

use crate as sys;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros

/// Trace output.
#[cfg(feature = "debug-log")]
#[macro_export]
macro_rules! out {
    ()                          => (eprintln!());
    ($fmt:literal)              => (eprintln!($fmt));
    ($fmt:literal, $($arg:tt)*) => (eprintln!($fmt, $($arg)*));
}

/// Trace output.
#[cfg(not(feature = "debug-log"))]
// Sink-writing keeps the arguments type-checked and used, without printing.
#[macro_export]
macro_rules! out {
    ()                          => ({});
    ($fmt:literal)              => ({ use std::io::{sink, Write}; let _ = write!(sink(), $fmt); });
    ($fmt:literal, $($arg:tt)*) => ({ use std::io::{sink, Write}; let _ = write!(sink(), $fmt, $($arg)*); });
}

/// Fetches a function from the loaded engine interface.
///
/// Assumes the binding is initialized and the function was provided by the engine; checked in debug builds.
#[macro_export]
macro_rules! interface_fn {
    ($name:ident) => {{
        let interface = unsafe { $crate::get_interface() };
        let function = interface.$name;

        debug_assert!(
            function.is_some(),
            concat!("engine does not provide interface function `", stringify!($name), "`")
        );

        // SAFETY: presence checked at load time by `initialize()`, for all functions this crate relies on.
        unsafe { function.unwrap_unchecked() }
    }};
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Utility functions

/// If `ptr` is not null, returns `Some(mapper(ptr))`; otherwise `None`.
#[inline]
pub fn ptr_then<T, R, F>(ptr: *mut T, mapper: F) -> Option<R>
where
    F: FnOnce(*mut T) -> R,
{
    // Could also use NonNull in signature, but for this project we always deal with FFI raw pointers
    if ptr.is_null() {
        None
    } else {
        Some(mapper(ptr))
    }
}

/// Returns a C `const char*` for a null-terminated byte string.
#[inline]
pub fn c_str(s: &[u8]) -> *const std::ffi::c_char {
    // Ensure null-terminated
    debug_assert!(!s.is_empty() && s[s.len() - 1] == 0);

    s.as_ptr() as *const std::ffi::c_char
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function types used for table loaders

pub(crate) type GetClassMethod = unsafe extern "C" fn(
    p_classname: sys::GDExtensionConstStringNamePtr,
    p_methodname: sys::GDExtensionConstStringNamePtr,
    p_hash: sys::GDExtensionInt,
) -> sys::GDExtensionMethodBindPtr;

pub(crate) fn load_class_method(
    get_method_bind: GetClassMethod,
    string_names: &mut sys::StringCache,
    class_name: &str,
    method_name: &str,
    hash: i64,
) -> sys::ClassMethodBind {
    crate::out!("Load class method {class_name}::{method_name} (hash {hash})...");

    let class_sname_ptr = string_names.fetch(class_name);
    let method_sname_ptr = string_names.fetch(method_name);

    // SAFETY: function pointers provided by the engine. We have no way to validate them.
    let method = unsafe { get_method_bind(class_sname_ptr, method_sname_ptr, hash) };

    if method.is_null() {
        panic!("Failed to load class method {class_name}::{method_name} (hash {hash}).{INFO}")
    }

    sys::ClassMethodBind(method)
}

pub(crate) const INFO: &str =
    "\nMake sure the extension API JSON matches the running engine version; a changed hash means the method signature changed.";
