/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ptr;

use gdbind_ffi as sys;
use sys::CachedMethodBind;

use crate::classes::Object;
use crate::meta::{read_slot, Signature, Slot};
use crate::obj::{ErgonomicAccess, GodotClass, Inherits, Raw, RawAccess};

/// Base class of reference-counted objects.
///
/// A `Gd<T>` of a reference-counted class that Rust owns holds exactly one reference. Ending its scope drops that reference;
/// the engine frees the object once the last reference is gone.
pub struct RefCounted {
    _private: (),
}

impl GodotClass for RefCounted {
    type Base = Object;

    const CLASS_NAME: &'static str = "RefCounted";
    const IS_REFCOUNTED: bool = true;
}

crate::impl_inherits!(RefCounted: Object);

static GET_REFERENCE_COUNT: CachedMethodBind = CachedMethodBind::new("RefCounted", "get_reference_count");
static UNREFERENCE: CachedMethodBind = CachedMethodBind::new("RefCounted", "unreference");

pub trait RefCountedRaw: RawAccess<Class: Inherits<RefCounted>> {
    fn get_reference_count(&self) -> i32 {
        // SAFETY: bind and signature match the class database; the receiver inherits RefCounted.
        unsafe {
            Signature::<(), i32>::out_class_ptrcall(
                GET_REFERENCE_COUNT.get(),
                "RefCounted",
                "get_reference_count",
                self,
                (),
            )
        }
    }
}

impl<T: Inherits<RefCounted>> RefCountedRaw for Raw<'_, T> {}

pub trait RefCountedApi: ErgonomicAccess<Class: Inherits<RefCounted>> {
    /// Current number of references, including the one held by Rust.
    fn get_reference_count(&self) -> i32 {
        self.raw().get_reference_count()
    }
}

impl<T: ErgonomicAccess<Class: Inherits<RefCounted>>> RefCountedApi for T {}

/// Drops one reference. Returns whether it was the last one, in which case the caller must destroy the object.
///
/// Bypasses call frames: it runs while releasing handles, where the lifetime registry must not be touched.
///
/// # Safety
/// The binding must be initialized, and `object` must be a live reference-counted object on which the caller holds a reference.
pub(crate) unsafe fn unreference_raw(object: sys::GDExtensionObjectPtr) -> bool {
    let mut ret: Slot = Default::default();

    sys::interface_fn!(object_method_bind_ptrcall)(
        UNREFERENCE.get().0,
        object,
        ptr::null(),
        ret.as_mut_ptr() as sys::GDExtensionTypePtr,
    );

    read_slot::<u8>(&ret) != 0
}
