/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_ffi as sys;

use crate::obj::{GodotClass, ObjectHandle};

/// Checks whether the object behind `handle` is a `U`, returning the handle retagged with `U`'s class.
///
/// `static_class` is the class Rust statically knows the object to be. If that already inherits `U` according to the class
/// database, no engine call is needed. Otherwise the engine decides, based on the object's dynamic class.
///
/// # Panics
/// If the object has been freed.
#[track_caller]
pub(crate) fn cast_handle<U: GodotClass>(handle: ObjectHandle, static_class: &str) -> Option<ObjectHandle> {
    let ptr = handle.validated_ptr(None).unwrap_or_else(|e| panic!("cannot cast to {}: {e}", U::CLASS_NAME));

    // SAFETY: object handles only exist once the binding is initialized.
    let class_db = unsafe { sys::class_db() };
    if class_db.inherits(static_class, U::CLASS_NAME) {
        return Some(handle.with_class(U::class_id()));
    }

    let class_tag = U::class_id().class_tag();
    if class_tag.is_null() {
        sys::out!("cast_handle: engine does not know class {}", U::CLASS_NAME);
        return None;
    }

    // SAFETY: ptr is a live object (validated above), tag comes from the engine.
    let cast_ptr = unsafe { sys::interface_fn!(object_cast_to)(ptr, class_tag) };

    sys::ptr_then(cast_ptr, |cast_ptr| {
        // The engine returns the same object, possibly at an adjusted address.
        // SAFETY: non-null result of object_cast_to is a live object.
        unsafe { ObjectHandle::from_sys(cast_ptr, U::class_id()) }
    })
}
