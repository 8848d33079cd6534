/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;

use gdbind_ffi as sys;
use sys::VariantType;

use crate::builtin::string::utf8_contents;
use crate::lifetime::{ErasedHandle, HandleKind, Managed, Scope};

impl_managed_builtin! {
    /// A string optimized for unique names.
    ///
    /// StringNames are immutable strings designed for representing unique names. StringName ensures that only one instance of a
    /// given name exists.
    pub struct StringName => StringName;
}

/// Index of the `String(StringName)` constructor.
const STRING_FROM_STRING_NAME: i32 = 2;

impl StringName {
    /// Interns `name` as a new string name, owned by `scope`.
    #[track_caller]
    pub fn from_str_in(scope: Scope, name: &str) -> Self {
        let mut opaque = sys::OpaqueStringName::zeroed();

        // SAFETY: string names can only be created once the binding is initialized.
        unsafe {
            sys::interface_fn!(string_name_new_with_utf8_chars_and_len)(
                opaque.as_mut_ptr(),
                name.as_ptr() as *const c_char,
                name.len() as i64,
            );
        }

        // SAFETY: the name was just created and is owned by nobody else.
        let handle = unsafe { ErasedHandle::from_opaque(HandleKind::StringName, &opaque) };
        Self::from_handle_in(handle, scope)
    }
}

impl From<&str> for StringName {
    /// Creates the name in the [ambient scope](Scope::ambient).
    fn from(name: &str) -> Self {
        Self::from_str_in(Scope::ambient(), name)
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: sys::OpaqueStringName = self.handle().to_opaque();

        // SAFETY: the handle is alive; the converted string is destroyed before returning.
        let text = unsafe {
            let constructor = sys::interface_fn!(variant_get_ptr_constructor)(
                VariantType::String.sys(),
                STRING_FROM_STRING_NAME,
            )
            .unwrap_or_else(|| panic!("engine has no String(StringName) constructor"));

            let mut string = sys::OpaqueString::zeroed();
            let args = [name.as_ptr()];
            constructor(string.as_mut_ptr(), args.as_ptr());

            let text = utf8_contents(string.as_ptr());
            sys::builtin_lifecycle_api().destructor(VariantType::String)(string.as_mut_ptr());
            text
        };

        f.write_str(&text)
    }
}
