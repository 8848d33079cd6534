/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

use gdbind_ffi as sys;

use crate::lifetime::{self, HandleKey, HandleState, Scope};
use crate::meta::error::{CallError, CallErrorReason, ClassRegistryError};
use crate::obj::{casts, ErgonomicAccess, GodotClass, Inherits, InstanceId, ObjectHandle, RawAccess, View};

/// Smart pointer to an engine object of class `T`.
///
/// A `Gd` is either **owned** or **engine-owned**:
/// - Owned pointers are registered in a [`Scope`]: objects created from Rust, and reference-counted objects that the engine
///   returned. Ending the scope releases the object (destroy, or drop one reference).
/// - Engine-owned pointers refer to objects that the engine frees on its own schedule, e.g. nodes in the scene tree. Rust never
///   releases them, but checks their instance ID before each call.
///
/// An owned pointer becomes engine-owned when it is passed to a method that takes over ownership, see
/// [`TransferToEngine`][crate::meta::TransferToEngine].
///
/// `Gd` is `!Send`: handles resolve only on the thread that registered them.
pub struct Gd<T: GodotClass> {
    inner: Cell<GdInner>,
    _marker: PhantomData<*const T>,
}

#[derive(Copy, Clone, Debug)]
pub(crate) enum GdInner {
    Owned(HandleKey),
    Engine(ObjectHandle),
}

impl<T: GodotClass> Gd<T> {
    /// Creates a new instance of `T` in the [ambient scope](Scope::ambient).
    ///
    /// # Panics
    /// If the class cannot be instantiated.
    #[track_caller]
    pub fn new() -> Self {
        Self::new_in(Scope::ambient())
    }

    /// Creates a new instance of `T`, owned by `scope`.
    ///
    /// # Panics
    /// If the class cannot be instantiated, or `scope` has ended.
    #[track_caller]
    pub fn new_in(scope: Scope) -> Self {
        Self::try_new_in(scope).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new_in(scope: Scope) -> Result<Self, ClassRegistryError> {
        let class_name = T::CLASS_NAME;

        // SAFETY: the binding is initialized once engine classes can be named.
        let instantiable = unsafe { sys::class_db() }
            .class(class_name)
            .is_some_and(|info| info.is_instantiable);

        if !instantiable {
            return Err(ClassRegistryError::NotInstantiable {
                class_name: class_name.to_string(),
            });
        }

        // SAFETY: valid class name; the engine returns an object with one reference if it is reference-counted.
        let ptr = unsafe { sys::interface_fn!(classdb_construct_object)(T::class_id().string_sys()) };
        if ptr.is_null() {
            return Err(ClassRegistryError::ConstructionFailed {
                class_name: class_name.to_string(),
            });
        }

        // SAFETY: freshly constructed, live object that nobody else owns.
        Ok(unsafe { Self::from_owned(ObjectHandle::from_sys(ptr, T::class_id()), scope) })
    }

    /// Takes ownership of `handle`, registering it in `scope`.
    ///
    /// # Safety
    /// Rust must own the object (one reference, for reference-counted ones), and it must not be registered anywhere else.
    #[doc(hidden)]
    #[track_caller]
    pub unsafe fn from_owned(handle: ObjectHandle, scope: Scope) -> Self {
        let key = scope.register(handle.into_erased());
        Self::from_owned_key(key)
    }

    pub(crate) fn from_owned_key(key: HandleKey) -> Self {
        Self::from_inner(GdInner::Owned(key))
    }

    /// Refers to an object that the engine owns. Rust will never release it.
    #[doc(hidden)]
    pub fn from_engine(handle: ObjectHandle) -> Self {
        Self::from_inner(GdInner::Engine(handle))
    }

    /// Looks up a live object by instance ID, as engine-owned pointer.
    ///
    /// Returns `None` if the object was freed or is not a `T`.
    pub fn try_from_instance_id(instance_id: InstanceId) -> Option<Self> {
        let handle = ObjectHandle::from_instance_id(instance_id, T::class_id())?;
        let handle = casts::cast_handle::<T>(handle, "Object")?;

        Some(Self::from_engine(handle))
    }

    /// Whether Rust owns the object, through a scope.
    pub fn is_owned(&self) -> bool {
        matches!(self.inner.get(), GdInner::Owned(_))
    }

    /// Whether the pointer may still be used: the scope is open and the engine has not freed the object.
    pub fn is_instance_valid(&self) -> bool {
        match self.inner.get() {
            GdInner::Owned(key) => {
                lifetime::handle_state(key) != HandleState::Released && self.object_handle().is_alive()
            }
            GdInner::Engine(handle) => handle.is_alive(),
        }
    }

    /// Handle and scope key, if owned.
    pub fn handle_key(&self) -> Option<HandleKey> {
        match self.inner.get() {
            GdInner::Owned(key) => Some(key),
            GdInner::Engine(_) => None,
        }
    }

    /// Current object handle, or the reason why it is no longer accessible.
    pub fn try_object_handle(&self) -> Result<ObjectHandle, CallError> {
        match self.inner.get() {
            GdInner::Owned(key) => {
                let handle = lifetime::try_get(key).map_err(|e| CallError::new(None, CallErrorReason::Lifetime(e)))?;
                Ok(ObjectHandle::from_bits(handle).with_class(T::class_id()))
            }
            GdInner::Engine(handle) => {
                handle.validated_ptr(None)?;
                Ok(handle)
            }
        }
    }

    /// **Upcast:** converts into a smart pointer to a base class. Always succeeds.
    pub fn upcast<Base>(self) -> Gd<Base>
    where
        Base: GodotClass,
        T: Inherits<Base>,
    {
        let inner = match self.inner.get() {
            GdInner::Engine(handle) => GdInner::Engine(handle.with_class(Base::class_id())),
            owned => owned,
        };

        Gd::from_inner(inner)
    }

    /// Runtime-checked view of the object as class `U`, or `None` if the object is not a `U`.
    ///
    /// The view borrows this pointer; it does not change ownership.
    ///
    /// # Panics
    /// If the object is no longer accessible.
    pub fn as_kind<U: GodotClass>(&self) -> Option<View<'_, U>> {
        let handle = self.object_handle();
        let handle = casts::cast_handle::<U>(handle, T::CLASS_NAME)?;

        Some(View::new(handle, self.handle_key()))
    }

    /// **Downcast:** tries to convert into a smart pointer to a derived class.
    ///
    /// If the object is not a `U`, returns `Err(self)`, so the pointer can still be used.
    pub fn try_cast<U: GodotClass>(self) -> Result<Gd<U>, Self> {
        let Some(handle) = casts::cast_handle::<U>(self.object_handle(), T::CLASS_NAME) else {
            return Err(self);
        };

        let inner = match self.inner.get() {
            GdInner::Engine(_) => GdInner::Engine(handle),
            owned => owned,
        };

        Ok(Gd::from_inner(inner))
    }

    /// **Downcast:** converts into a smart pointer to a derived class. Panics on error.
    #[track_caller]
    pub fn cast<U: GodotClass>(self) -> Gd<U> {
        self.try_cast().unwrap_or_else(|gd| {
            panic!(
                "downcast from {from} to {to} failed; instance {id}",
                from = T::CLASS_NAME,
                to = U::CLASS_NAME,
                id = gd.instance_id(),
            )
        })
    }

    /// Releases an owned object now, instead of when its scope ends.
    ///
    /// # Panics
    /// If the object is engine-owned, already released, or lent to a call frame.
    #[track_caller]
    pub fn release(self) {
        match self.inner.get() {
            GdInner::Owned(key) => lifetime::release(key),
            GdInner::Engine(handle) => panic!("cannot release engine-owned object {handle:?}"),
        }
    }

    pub(crate) fn inner_cell(&self) -> &Cell<GdInner> {
        &self.inner
    }

    fn from_inner(inner: GdInner) -> Self {
        Self {
            inner: Cell::new(inner),
            _marker: PhantomData,
        }
    }
}

impl<T: GodotClass> RawAccess for Gd<T> {
    type Class = T;

    #[track_caller]
    fn object_handle(&self) -> ObjectHandle {
        match self.inner.get() {
            GdInner::Owned(key) => ObjectHandle::from_bits(lifetime::get(key)).with_class(T::class_id()),
            GdInner::Engine(handle) => handle,
        }
    }

    fn handle_key(&self) -> Option<HandleKey> {
        Gd::handle_key(self)
    }
}

impl<T: GodotClass> ErgonomicAccess for Gd<T> {}

impl<T: GodotClass> PartialEq for Gd<T> {
    /// Two pointers are equal if they refer to the same object.
    fn eq(&self, other: &Self) -> bool {
        self.object_handle().instance_id() == other.object_handle().instance_id()
    }
}

impl<T: GodotClass> Eq for Gd<T> {}

impl<T: GodotClass> fmt::Debug for Gd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.get() {
            GdInner::Owned(key) => match lifetime::try_get(key) {
                Ok(handle) => {
                    let handle = ObjectHandle::from_bits(handle);
                    write!(f, "Gd<{}>(owned, id={})", T::CLASS_NAME, handle.instance_id())
                }
                Err(e) => write!(f, "Gd<{}>(dead: {e})", T::CLASS_NAME),
            },
            GdInner::Engine(handle) => {
                write!(f, "Gd<{}>(engine, id={})", T::CLASS_NAME, handle.instance_id())
            }
        }
    }
}

/// Hands an owned, not reference-counted object over to the engine, after a call that took ownership of it.
///
/// Afterwards the pointer is engine-owned; it stays usable as long as the engine keeps the object alive.
pub(crate) fn finish_transfer(cell: &Cell<GdInner>, key: HandleKey) -> Result<(), CallError> {
    let handle = lifetime::take(key).map_err(|e| CallError::new(None, CallErrorReason::Lifetime(e)))?;
    cell.set(GdInner::Engine(ObjectHandle::from_erased(handle)));

    Ok(())
}
