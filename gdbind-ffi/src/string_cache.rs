/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate as sys;

/// Caches `StringName` instances while method tables are loaded.
///
/// Class and method names repeat a lot across a table load (every method of `Label` needs the `"Label"` name), so each distinct
/// name is constructed once. All names are destroyed when the cache is dropped.
pub struct StringCache<'a> {
    // Box is needed for element stability (new insertions don't move object; i.e. pointers to it remain valid).
    instances_by_str: HashMap<String, Box<sys::types::OpaqueStringName>>,
    interface: &'a sys::EngineInterface,
    builtin_lifecycle: &'a sys::BuiltinLifecycleTable,
}

impl<'a> StringCache<'a> {
    pub fn new(
        interface: &'a sys::EngineInterface,
        builtin_lifecycle: &'a sys::BuiltinLifecycleTable,
    ) -> Self {
        Self {
            instances_by_str: HashMap::new(),
            interface,
            builtin_lifecycle,
        }
    }

    /// Get a pointer to a `StringName`. Reuses cached instances, only deallocates on destruction of this cache.
    pub fn fetch(&mut self, key: &str) -> sys::GDExtensionStringNamePtr {
        // Already cached.
        if let Some(opaque_box) = self.instances_by_str.get_mut(key) {
            return box_to_sname_ptr(opaque_box);
        }

        let mut opaque_box = Box::new(sys::types::OpaqueStringName::zeroed());

        // SAFETY: the interface was loaded from the engine; the destination is valid, writable storage of the right size.
        unsafe {
            let string_name_new_with_utf8_chars_and_len = self
                .interface
                .string_name_new_with_utf8_chars_and_len
                .unwrap_unchecked();

            string_name_new_with_utf8_chars_and_len(
                opaque_box.as_mut_ptr(),
                key.as_ptr() as *const std::ffi::c_char,
                key.len() as sys::GDExtensionInt,
            );
        }

        let sname_ptr = box_to_sname_ptr(&mut opaque_box);
        self.instances_by_str.insert(key.to_owned(), opaque_box);
        sname_ptr
    }

    pub fn len(&self) -> usize {
        self.instances_by_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances_by_str.is_empty()
    }
}

/// Destroy all string names.
impl Drop for StringCache<'_> {
    fn drop(&mut self) {
        let string_name_destroy = self.builtin_lifecycle.destructor(sys::VariantType::StringName);

        for (_, mut opaque_box) in self.instances_by_str.drain() {
            // SAFETY: each box holds a string name constructed in fetch(), destroyed exactly once here.
            unsafe { string_name_destroy(opaque_box.as_mut_ptr()) };
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementation
// Tiny wrapper to avoid exposed `as` casts (which are very easy to get wrong, i.e. extra dereference).

fn box_to_sname_ptr(boxed: &mut Box<sys::types::OpaqueStringName>) -> sys::GDExtensionStringNamePtr {
    boxed.as_mut_ptr() as sys::GDExtensionStringNamePtr
}
