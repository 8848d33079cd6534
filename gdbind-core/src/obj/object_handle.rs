/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use gdbind_ffi as sys;

use crate::classes::ref_counted;
use crate::lifetime::{ErasedHandle, HandleBits, HandleKind};
use crate::meta::error::{CallError, CallErrorReason};
use crate::meta::{CallContext, ClassId};
use crate::obj::InstanceId;

/// Pointer to an engine object, together with the instance ID it had when Rust first saw it.
///
/// The instance ID lets Rust detect that the engine has freed the object: a freed ID never resolves to an object again.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ObjectHandle {
    ptr: sys::GDExtensionObjectPtr,
    instance_id: InstanceId,
    class_id: ClassId,
}

impl ObjectHandle {
    /// Reads the instance ID of a live object.
    ///
    /// # Safety
    /// `ptr` must point to a live engine object, and the binding must be initialized.
    ///
    /// # Panics
    /// If the engine reports instance ID 0.
    pub unsafe fn from_sys(ptr: sys::GDExtensionObjectPtr, class_id: ClassId) -> Self {
        debug_assert!(!ptr.is_null(), "ObjectHandle::from_sys(null)");

        let raw_id = sys::interface_fn!(object_get_instance_id)(ptr);
        let instance_id = InstanceId::try_from_u64(raw_id)
            .unwrap_or_else(|| panic!("engine object {ptr:p} has instance ID 0"));

        Self {
            ptr,
            instance_id,
            class_id,
        }
    }

    /// Looks up a live object by instance ID.
    pub fn from_instance_id(instance_id: InstanceId, class_id: ClassId) -> Option<Self> {
        if !sys::is_initialized() {
            return None;
        }

        // SAFETY: binding initialized.
        let ptr = unsafe { sys::interface_fn!(object_get_instance_from_id)(instance_id.to_u64()) };
        sys::ptr_then(ptr, |ptr| Self {
            ptr,
            instance_id,
            class_id,
        })
    }

    pub fn ptr(&self) -> sys::GDExtensionObjectPtr {
        self.ptr
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Static class that Rust knows for the object. The dynamic class may be more derived.
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn with_class(self, class_id: ClassId) -> Self {
        Self { class_id, ..self }
    }

    /// Whether the engine still maps the instance ID to this pointer.
    pub fn is_alive(&self) -> bool {
        Self::from_instance_id(self.instance_id, self.class_id).is_some_and(|live| live.ptr == self.ptr)
    }

    /// Returns the pointer for a call, after checking liveness if the library enabled instance ID validation.
    pub(crate) fn validated_ptr(&self, call_ctx: Option<&CallContext>) -> Result<sys::GDExtensionObjectPtr, CallError> {
        // SAFETY: binding initialized, since this handle was created by querying the engine.
        let validate = cfg!(safeguards_strict) || unsafe { sys::config() }.validate_object_ids;

        if validate && !self.is_alive() {
            return Err(CallError::new(
                call_ctx,
                CallErrorReason::DeadObject {
                    instance_id: self.instance_id,
                },
            ));
        }

        Ok(self.ptr)
    }

    /// Turns the pointer into a handle that stands for Rust's ownership of the object.
    ///
    /// # Safety
    /// Rust must own the object (one reference, for reference-counted ones), and no other `ErasedHandle` for it may exist.
    pub(crate) unsafe fn into_erased(self) -> ErasedHandle {
        ErasedHandle::new(
            HandleKind::Object,
            [self.ptr as u64, self.instance_id.to_u64(), self.class_id.to_u64()],
        )
    }

    /// Consumes an owned object handle, e.g. after its ownership moved to the engine.
    ///
    /// # Panics
    /// If `handle` is not an object handle.
    pub fn from_erased(handle: ErasedHandle) -> Self {
        Self::from_bits(handle.bits())
    }

    /// # Panics
    /// If `bits` do not belong to an object handle.
    pub fn from_bits(bits: HandleBits) -> Self {
        assert_eq!(bits.kind(), HandleKind::Object, "not an object handle: {bits:?}");

        let [ptr, instance_id, class_index] = *bits.words();
        Self {
            ptr: ptr as sys::GDExtensionObjectPtr,
            instance_id: InstanceId::try_from_u64(instance_id).expect("object handle without instance ID"),
            class_id: ClassId::from_u64(class_index),
        }
    }

    /// Gives up Rust's ownership: drops one reference of a reference-counted object, destroys any other object.
    ///
    /// # Safety
    /// Rust must own the object (one reference, for reference-counted ones), and must not use this handle afterwards.
    pub(crate) unsafe fn release(self) {
        if !self.is_alive() {
            crate::godot_warn!(
                "object {:?} (instance {}) was already freed by the engine; skipping release",
                self.class_id,
                self.instance_id
            );
            return;
        }

        if self.instance_id.is_ref_counted() {
            if ref_counted::unreference_raw(self.ptr) {
                sys::interface_fn!(object_destroy)(self.ptr);
            }
        } else {
            sys::interface_fn!(object_destroy)(self.ptr);
        }
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle({:?}, {:p}, {})", self.class_id, self.ptr, self.instance_id)
    }
}
