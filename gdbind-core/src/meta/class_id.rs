/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::sync::OnceLock;

use gdbind_ffi as sys;
use sys::Global;

use crate::obj::GodotClass;

/// Global cache of class names.
static CLASS_ID_CACHE: Global<ClassIdCache> = Global::new(ClassIdCache::new);

/// Drops the engine string names cached for all classes.
///
/// # Safety
/// Must be called while the binding is still initialized, and no `string_sys()` pointer may be used afterwards.
pub unsafe fn cleanup() {
    CLASS_ID_CACHE.lock().clear();
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Globally unique ID of an engine class.
///
/// Cheap to copy and compare. The class name, its engine `StringName` and its class tag are cached globally, not per instance.
///
/// You can access existing classes' ID using [`GodotClass::class_id()`][crate::obj::GodotClass::class_id]. Classes only known at
/// runtime use [`new_dynamic()`][Self::new_dynamic].
///
/// # Ordering
/// `ClassId`s are **not** ordered lexicographically, and the order is not stable across runs.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClassId {
    global_index: u16,
}

impl ClassId {
    /// Class ID for the type `T`; `init_fn` is only invoked the first time.
    ///
    /// Calling this from different places for the same `T` is allowed, but `init_fn` must then return the same string.
    pub fn new_cached<T: GodotClass>(init_fn: impl FnOnce() -> String) -> Self {
        Self::new_cached_inner::<T>(init_fn)
    }

    // Without bounds.
    fn new_cached_inner<T: 'static>(init_fn: impl FnOnce() -> String) -> ClassId {
        let type_id = TypeId::of::<T>();

        if let Some(global_index) = CLASS_ID_CACHE.read().get_by_type_id(type_id) {
            return ClassId { global_index };
        }

        let name = init_fn();
        CLASS_ID_CACHE
            .lock()
            .insert_class_id(Cow::Owned(name), Some(type_id))
    }

    /// Class ID from a name only known at runtime, e.g. the dynamic class of an engine object.
    ///
    /// Multiple calls with the same name return equal `ClassId` instances.
    pub fn new_dynamic(class_name: impl Into<Cow<'static, str>>) -> Self {
        let class_name = class_name.into();

        if let Some(&global_index) = CLASS_ID_CACHE.read().string_to_index.get(class_name.as_ref()) {
            return ClassId { global_index };
        }

        CLASS_ID_CACHE.lock().insert_class_id(class_name, None)
    }

    /// "No class", used for object handles whose static class is unknown.
    pub fn none() -> Self {
        // First element is always the empty string name.
        Self { global_index: 0 }
    }

    pub fn is_none(&self) -> bool {
        self.global_index == 0
    }

    /// Returns an owned or borrowed `str` representing the class name.
    pub fn to_cow_str(&self) -> Cow<'static, str> {
        CLASS_ID_CACHE.read().get_entry(self.global_index).rust_str.clone()
    }

    /// Engine `StringName` of the class. Valid until [`cleanup()`].
    ///
    /// Entries are never removed, and the string name is boxed, so the pointer stays stable across cache growth.
    #[doc(hidden)]
    pub fn string_sys(&self) -> sys::GDExtensionConstStringNamePtr {
        let cache = CLASS_ID_CACHE.read();
        let entry = cache.get_entry(self.global_index);

        entry
            .godot_str
            .get_or_init(|| EngineStringName::new(&entry.rust_str))
            .as_ptr()
    }

    /// Engine class tag, as used by `object_cast_to`. Null if the engine does not know the class.
    #[doc(hidden)]
    pub fn class_tag(&self) -> *mut c_void {
        let cache = CLASS_ID_CACHE.read();
        let entry = cache.get_entry(self.global_index);

        let tag = *entry.class_tag.get_or_init(|| {
            let name = entry
                .godot_str
                .get_or_init(|| EngineStringName::new(&entry.rust_str));

            // SAFETY: binding initialized, since a string name was just created; name is a valid StringName.
            let tag = unsafe { sys::interface_fn!(classdb_get_class_tag)(name.as_ptr()) };
            tag as usize
        });

        tag as *mut c_void
    }

    pub(crate) fn to_u64(self) -> u64 {
        self.global_index as u64
    }

    pub(crate) fn from_u64(value: u64) -> Self {
        let global_index = u16::try_from(value).unwrap_or(0);
        debug_assert!(
            (global_index as usize) < CLASS_ID_CACHE.read().entries.len(),
            "invalid class index {value}"
        );

        Self { global_index }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_cow_str().fmt(f)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.to_cow_str();

        if name.is_empty() {
            write!(f, "ClassId(none)")
        } else {
            write!(f, "ClassId({name:?})")
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Engine `StringName` that is not tracked by the lifetime registry, but lives as long as the class cache.
struct EngineStringName(Box<sys::OpaqueStringName>);

impl EngineStringName {
    fn new(name: &str) -> Self {
        let mut opaque = Box::new(sys::OpaqueStringName::zeroed());

        // SAFETY: only called after initialization (the class cache is not asked for engine names before that).
        unsafe {
            sys::interface_fn!(string_name_new_with_utf8_chars_and_len)(
                opaque.as_mut_ptr(),
                name.as_ptr() as *const std::ffi::c_char,
                name.len() as sys::GDExtensionInt,
            );
        }

        Self(opaque)
    }

    fn as_ptr(&self) -> sys::GDExtensionConstStringNamePtr {
        self.0.as_ptr()
    }
}

impl Drop for EngineStringName {
    fn drop(&mut self) {
        if !sys::is_initialized() {
            return;
        }

        // SAFETY: binding initialized; the string name was constructed by the engine and is destroyed exactly once.
        unsafe {
            let destructor = sys::builtin_lifecycle_api().destructor(sys::VariantType::StringName);
            destructor(self.0.as_mut_ptr());
        }
    }
}

// SAFETY: the engine's StringName is immutable and internally reference-counted with atomics; the box is never mutated after
// construction except by the destructor, which runs under the cache's write lock.
unsafe impl Send for EngineStringName {}
// SAFETY: see `Send` impl.
unsafe impl Sync for EngineStringName {}

/// Entry in the class name cache.
///
/// `godot_str` and `class_tag` are lazy, because the binding may not be initialized when the ID is first created.
struct ClassIdEntry {
    rust_str: Cow<'static, str>,
    godot_str: OnceLock<EngineStringName>,
    class_tag: OnceLock<usize>,
}

impl ClassIdEntry {
    fn new(rust_str: Cow<'static, str>) -> Self {
        Self {
            rust_str,
            godot_str: OnceLock::new(),
            class_tag: OnceLock::new(),
        }
    }
}

/// Unified cache for all class name data.
struct ClassIdCache {
    /// All class name entries, with index representing [`ClassId::global_index`].
    /// First element (index 0) is always the empty string name, which is used for "no class".
    entries: Vec<ClassIdEntry>,
    type_to_index: HashMap<TypeId, u16>,
    string_to_index: HashMap<String, u16>,
}

impl ClassIdCache {
    fn new() -> Self {
        let mut string_to_index = HashMap::new();
        string_to_index.insert(String::new(), 0);

        Self {
            entries: vec![ClassIdEntry::new(Cow::Borrowed(""))],
            type_to_index: HashMap::new(),
            string_to_index,
        }
    }

    /// Looks up entries and if not present, inserts them.
    fn insert_class_id(&mut self, source: Cow<'static, str>, type_id: Option<TypeId>) -> ClassId {
        if let Some(&existing_index) = self.string_to_index.get(source.as_ref()) {
            // Dynamic-then-static case: remember the type for the next lookup.
            if let Some(type_id) = type_id {
                self.type_to_index.entry(type_id).or_insert(existing_index);
            }

            return ClassId {
                global_index: existing_index,
            };
        }

        let global_index = self
            .entries
            .len()
            .try_into()
            .unwrap_or_else(|_| panic!("ClassId cache exceeded maximum capacity of 65536 entries"));

        self.entries.push(ClassIdEntry::new(source.clone()));
        self.string_to_index.insert(source.into_owned(), global_index);

        if let Some(type_id) = type_id {
            self.type_to_index.insert(type_id, global_index);
        }

        ClassId { global_index }
    }

    fn get_by_type_id(&self, type_id: TypeId) -> Option<u16> {
        self.type_to_index.get(&type_id).copied()
    }

    fn get_entry(&self, index: u16) -> &ClassIdEntry {
        &self.entries[index as usize]
    }

    fn clear(&mut self) {
        // Keep the entries so that existing `ClassId` values stay valid across a reload; only engine data is dropped.
        for entry in &mut self.entries {
            entry.godot_str = OnceLock::new();
            entry.class_tag = OnceLock::new();
        }

        self.type_to_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_ids_are_deduplicated() {
        let a = ClassId::new_dynamic("UnitTestClassA");
        let b = ClassId::new_dynamic(String::from("UnitTestClassA"));
        let c = ClassId::new_dynamic("UnitTestClassC");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_cow_str(), "UnitTestClassA");
    }

    #[test]
    fn none_is_empty() {
        assert!(ClassId::none().is_none());
        assert_eq!(format!("{:?}", ClassId::none()), "ClassId(none)");
        assert_eq!(ClassId::from_u64(ClassId::none().to_u64()), ClassId::none());
    }

    #[test]
    fn index_roundtrips_through_words() {
        let id = ClassId::new_dynamic("UnitTestRoundtrip");
        assert_eq!(ClassId::from_u64(id.to_u64()), id);
    }
}
