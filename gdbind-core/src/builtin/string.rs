/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;
use std::ptr;

use gdbind_ffi as sys;

use crate::lifetime::{ErasedHandle, HandleKind, Managed, Scope};
use crate::meta::{Frame, FrameArg};

impl_managed_builtin! {
    /// Godot's reference counted string type.
    ///
    /// The string data lives in the engine; this value is a key into the [`Scope`] that owns it. Convert to a Rust `String` with
    /// [`to_string()`](ToString::to_string), which copies the contents.
    pub struct GString => String;
}

impl GString {
    /// Copies `text` into a new engine string, owned by `scope`.
    #[track_caller]
    pub fn from_str_in(scope: Scope, text: &str) -> Self {
        // SAFETY: strings can only be created once the binding is initialized.
        let handle = unsafe { new_string_handle(text) };
        Self::from_handle_in(handle, scope)
    }

    /// Number of bytes in the UTF-8 representation.
    pub fn utf8_len(&self) -> usize {
        let opaque: sys::OpaqueString = self.handle().to_opaque();

        // SAFETY: the handle is alive (checked by handle()); a null buffer only queries the length.
        let len = unsafe { sys::interface_fn!(string_to_utf8_chars)(opaque.as_ptr(), ptr::null_mut(), 0) };
        len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.utf8_len() == 0
    }
}

impl From<&str> for GString {
    /// Creates the string in the [ambient scope](Scope::ambient).
    fn from(text: &str) -> Self {
        Self::from_str_in(Scope::ambient(), text)
    }
}

impl fmt::Display for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opaque: sys::OpaqueString = self.handle().to_opaque();

        // SAFETY: the handle is alive; the engine writes at most `len` bytes.
        let text = unsafe { utf8_contents(opaque.as_ptr()) };
        f.write_str(&text)
    }
}

/// String literals are passed as temporary engine strings, released together with the frame.
impl<'a> FrameArg<'a> for &str {
    fn push_to(self, frame: &mut Frame<'a>) {
        // SAFETY: frames are only used with an initialized binding.
        let handle = unsafe { new_string_handle(self) };
        frame.push_temporary(handle);
    }
}

/// # Safety
/// The binding must be initialized.
pub(crate) unsafe fn new_string_handle(text: &str) -> ErasedHandle {
    let mut opaque = sys::OpaqueString::zeroed();
    sys::interface_fn!(string_new_with_utf8_chars_and_len)(
        opaque.as_mut_ptr(),
        text.as_ptr() as *const c_char,
        text.len() as i64,
    );

    ErasedHandle::from_opaque(HandleKind::String, &opaque)
}

/// Copies the UTF-8 contents of an engine string.
///
/// # Safety
/// `string_ptr` must point to a live engine string.
pub(crate) unsafe fn utf8_contents(string_ptr: sys::GDExtensionConstStringPtr) -> String {
    let len = sys::interface_fn!(string_to_utf8_chars)(string_ptr, ptr::null_mut(), 0);
    if len <= 0 {
        return String::new();
    }

    let mut buffer = vec![0u8; len as usize];
    sys::interface_fn!(string_to_utf8_chars)(string_ptr, buffer.as_mut_ptr() as *mut c_char, len);

    String::from_utf8_lossy(&buffer).into_owned()
}
