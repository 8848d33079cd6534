/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Two projections of the same object pointer.
//!
//! Class APIs come in two flavors, implemented as traits over these projections:
//! - **Raw** methods take an explicit [`Scope`][crate::lifetime::Scope] for every engine value they return, and return the
//!   managed engine types (`GString`, `Array`, ...). Nothing is converted or copied.
//! - **Ergonomic** methods run inside a temporary scope and return Rust values (`String`, `Vec`, ...), so the caller never sees a
//!   scope.
//!
//! Every [`ErgonomicAccess`] type can switch to the raw flavor through [`raw()`](ErgonomicAccess::raw).

use std::fmt;
use std::marker::PhantomData;

use crate::lifetime::HandleKey;
use crate::obj::{GodotClass, InstanceId, ObjectHandle};

/// Lifetime-explicit access to an object of class [`Class`](Self::Class).
pub trait RawAccess {
    type Class: GodotClass;

    /// Current handle of the object.
    ///
    /// # Panics
    /// If the object was owned by a scope that has ended.
    fn object_handle(&self) -> ObjectHandle;

    /// Key under which the object is registered, if Rust owns it. Call frames borrow it for the duration of a call.
    #[doc(hidden)]
    fn handle_key(&self) -> Option<HandleKey> {
        None
    }

    fn instance_id(&self) -> InstanceId {
        self.object_handle().instance_id()
    }
}

/// Convenience access to an object, with temporary lifetimes handled internally.
pub trait ErgonomicAccess: RawAccess {
    /// Raw projection of the same object.
    fn raw(&self) -> Raw<'_, Self::Class> {
        Raw::new(self.object_handle(), self.handle_key())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Raw projection of an object pointer. Only offers the lifetime-explicit API of `T` and its base classes.
pub struct Raw<'a, T: GodotClass> {
    handle: ObjectHandle,
    key: Option<HandleKey>,
    _borrow: PhantomData<&'a ()>,
    _class: PhantomData<*const T>,
}

impl<T: GodotClass> Raw<'_, T> {
    pub(crate) fn new(handle: ObjectHandle, key: Option<HandleKey>) -> Self {
        Self {
            handle,
            key,
            _borrow: PhantomData,
            _class: PhantomData,
        }
    }
}

impl<T: GodotClass> RawAccess for Raw<'_, T> {
    type Class = T;

    fn object_handle(&self) -> ObjectHandle {
        self.handle
    }

    fn handle_key(&self) -> Option<HandleKey> {
        self.key
    }
}

impl<T: GodotClass> fmt::Debug for Raw<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Raw<{}>({})", T::CLASS_NAME, self.handle.instance_id())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Object viewed as class `T`, after a successful runtime check. Returned by [`Gd::as_kind()`][crate::obj::Gd::as_kind].
///
/// Borrows the pointer it was created from, so it cannot outlive it. Offers both the raw and the ergonomic API of `T`.
pub struct View<'a, T: GodotClass> {
    handle: ObjectHandle,
    key: Option<HandleKey>,
    _borrow: PhantomData<&'a ()>,
    _class: PhantomData<*const T>,
}

impl<T: GodotClass> View<'_, T> {
    pub(crate) fn new(handle: ObjectHandle, key: Option<HandleKey>) -> Self {
        debug_assert_eq!(handle.class_id(), T::class_id());

        Self {
            handle,
            key,
            _borrow: PhantomData,
            _class: PhantomData,
        }
    }
}

impl<T: GodotClass> RawAccess for View<'_, T> {
    type Class = T;

    fn object_handle(&self) -> ObjectHandle {
        self.handle
    }

    fn handle_key(&self) -> Option<HandleKey> {
        self.key
    }
}

impl<T: GodotClass> ErgonomicAccess for View<'_, T> {}

impl<T: GodotClass> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View<{}>({})", T::CLASS_NAME, self.handle.instance_id())
    }
}
