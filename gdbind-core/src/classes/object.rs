/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_ffi as sys;
use sys::{CachedMethodBind, InitLevel};

use crate::builtin::GString;
use crate::lifetime::{with_scope, Scope};
use crate::meta::Signature;
use crate::obj::{ErgonomicAccess, GodotClass, Inherits, NoBase, Ownership, Raw, RawAccess};

/// Base class of all engine classes.
///
/// Objects that do not inherit [`RefCounted`][crate::classes::RefCounted] are freed explicitly: by their owning scope if Rust
/// created them, or by the engine otherwise.
pub struct Object {
    _private: (),
}

impl GodotClass for Object {
    type Base = NoBase;

    const CLASS_NAME: &'static str = "Object";
    const IS_REFCOUNTED: bool = false;
    const INIT_LEVEL: InitLevel = InitLevel::Core;
}

static GET_CLASS: CachedMethodBind = CachedMethodBind::new("Object", "get_class");
static IS_CLASS: CachedMethodBind = CachedMethodBind::new("Object", "is_class");
static GET_INSTANCE_ID: CachedMethodBind = CachedMethodBind::new("Object", "get_instance_id");

/// Lifetime-explicit methods of `Object`, available on the [raw projection](ErgonomicAccess::raw) of every object.
pub trait ObjectRaw: RawAccess<Class: Inherits<Object>> {
    /// Name of the object's dynamic class, owned by `scope`.
    fn get_class(&self, scope: Scope) -> GString {
        // SAFETY: bind and signature match the class database; the receiver inherits Object.
        unsafe {
            Signature::<(), GString>::out_class_ptrcall_with(
                GET_CLASS.get(),
                "Object",
                "get_class",
                self,
                (),
                Ownership::Transferred,
                scope,
            )
        }
    }

    /// Whether the object is an instance of `class`, or a subclass of it.
    fn is_class(&self, class: &GString) -> bool {
        // SAFETY: see get_class().
        unsafe { Signature::<(&GString,), bool>::out_class_ptrcall(IS_CLASS.get(), "Object", "is_class", self, (class,)) }
    }

    fn get_instance_id(&self) -> i64 {
        // SAFETY: see get_class().
        unsafe {
            Signature::<(), i64>::out_class_ptrcall(GET_INSTANCE_ID.get(), "Object", "get_instance_id", self, ())
        }
    }
}

impl<T: Inherits<Object>> ObjectRaw for Raw<'_, T> {}

/// Convenience methods of `Object`, returning Rust values.
pub trait ObjectApi: ErgonomicAccess<Class: Inherits<Object>> {
    /// Name of the object's dynamic class.
    fn get_class(&self) -> String {
        with_scope(|scope| self.raw().get_class(scope).to_string())
    }

    fn is_class(&self, class: &str) -> bool {
        with_scope(|scope| {
            let class = GString::from_str_in(scope, class);
            self.raw().is_class(&class)
        })
    }
}

impl<T: ErgonomicAccess<Class: Inherits<Object>>> ObjectApi for T {}
