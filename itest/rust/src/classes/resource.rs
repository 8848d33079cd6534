/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::builtin::GString;
use gdbind::classes::{Object, RefCounted};
use gdbind::lifetime::{with_scope, Scope};
use gdbind::meta::Signature;
use gdbind::obj::{ErgonomicAccess, Gd, GodotClass, Inherits, Ownership, Raw, RawAccess};
use gdbind::sys::CachedMethodBind;

/// Reference-counted data container, usually loaded from a file.
pub struct Resource {
    _private: (),
}

impl GodotClass for Resource {
    type Base = RefCounted;

    const CLASS_NAME: &'static str = "Resource";
}

gdbind::impl_inherits!(Resource: RefCounted, Object);

static SET_PATH: CachedMethodBind = CachedMethodBind::new("Resource", "set_path");
static GET_PATH: CachedMethodBind = CachedMethodBind::new("Resource", "get_path");
static DUPLICATE: CachedMethodBind = CachedMethodBind::new("Resource", "duplicate");

pub trait ResourceRaw: RawAccess<Class: Inherits<Resource>> {
    fn set_path(&self, path: &GString) {
        // SAFETY: bind and signature match the class database; the receiver inherits Resource.
        unsafe { Signature::<(&GString,), ()>::out_class_ptrcall(SET_PATH.get(), "Resource", "set_path", self, (path,)) }
    }

    fn get_path(&self, scope: Scope) -> GString {
        // SAFETY: see set_path().
        unsafe {
            Signature::<(), GString>::out_class_ptrcall_with(
                GET_PATH.get(),
                "Resource",
                "get_path",
                self,
                (),
                Ownership::Transferred,
                scope,
            )
        }
    }

    /// Copy of the resource. The engine hands over one reference, which `scope` drops when it ends.
    fn duplicate(&self, subresources: bool, scope: Scope) -> Option<Gd<Resource>> {
        // SAFETY: see set_path().
        unsafe {
            Signature::<(bool,), Option<Gd<Resource>>>::out_class_ptrcall_with(
                DUPLICATE.get(),
                "Resource",
                "duplicate",
                self,
                (subresources,),
                Ownership::Transferred,
                scope,
            )
        }
    }
}

impl<T: Inherits<Resource>> ResourceRaw for Raw<'_, T> {}

pub trait ResourceApi: ErgonomicAccess<Class: Inherits<Resource>> {
    fn set_path(&self, path: &str) {
        with_scope(|scope| {
            let path = GString::from_str_in(scope, path);
            self.raw().set_path(&path)
        })
    }

    fn get_path(&self) -> String {
        with_scope(|scope| self.raw().get_path(scope).to_string())
    }

    /// Shallow copy, owned by the ambient scope.
    fn duplicate(&self) -> Option<Gd<Resource>> {
        self.raw().duplicate(false, Scope::ambient())
    }
}

impl<T: ErgonomicAccess<Class: Inherits<Resource>>> ResourceApi for T {}
