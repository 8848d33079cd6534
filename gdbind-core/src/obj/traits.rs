/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_ffi as sys;
use sys::InitLevel;

use crate::meta::ClassId;

/// Makes `T` eligible to be managed by the engine and stored in [`Gd<T>`][crate::obj::Gd] pointers.
///
/// Implemented for every engine class exposed to Rust. Classes differ in how their instances are owned: reference-counted ones
/// are released by dropping a reference, all others by destroying the object.
pub trait GodotClass: 'static + Sized {
    /// The immediate superclass of `T`. [`NoBase`] for `Object`.
    type Base: GodotClass;

    /// Name of the class in the engine's class database.
    const CLASS_NAME: &'static str;

    /// Whether the class inherits `RefCounted`. Derived classes inherit this flag.
    const IS_REFCOUNTED: bool = <Self::Base as GodotClass>::IS_REFCOUNTED;

    /// Initialization level, during which this class becomes available.
    ///
    /// It must not be less than `Base::INIT_LEVEL`.
    const INIT_LEVEL: InitLevel = <Self::Base as GodotClass>::INIT_LEVEL;

    /// Globally unique class ID, linked to [`CLASS_NAME`][Self::CLASS_NAME].
    fn class_id() -> ClassId {
        ClassId::new_cached::<Self>(|| Self::CLASS_NAME.to_string())
    }

    /// Returns whether `Self` inherits from `Base`, according to the static hierarchy.
    ///
    /// This is reflexive, i.e `Self` inherits from itself.
    fn inherits<Base: GodotClass>() -> bool {
        if Self::CLASS_NAME == Base::CLASS_NAME {
            true
        } else if Self::Base::CLASS_NAME == NoBase::CLASS_NAME {
            false
        } else {
            Self::Base::inherits::<Base>()
        }
    }
}

/// Type representing the absence of a base class, at the root of the hierarchy.
///
/// `NoBase` is used as the base class for exactly one class: [`Object`][crate::classes::Object].
///
/// This is an enum without any variants, as we should never construct an instance of this class.
pub enum NoBase {}

impl GodotClass for NoBase {
    type Base = NoBase;

    const CLASS_NAME: &'static str = "(no base)";
    const IS_REFCOUNTED: bool = false;
    const INIT_LEVEL: InitLevel = InitLevel::Core;
}

/// Non-strict inheritance relationship in the engine class hierarchy.
///
/// `Derived: Inherits<Base>` means that either `Derived` is a subclass of `Base`, or the class `Base` itself (hence "non-strict").
///
/// This trait is automatically implemented for all engine classes and user-defined classes that derive from them.
///
/// # Safety
/// This trait must only be implemented for subclasses of `Base`: upcasts and projections reinterpret the object pointer.
pub unsafe trait Inherits<Base: GodotClass>: GodotClass {
    /// True iff `Self == Base`.
    const IS_SAME_CLASS: bool = false;
}

// SAFETY: Every class is a subclass of itself.
unsafe impl<T: GodotClass> Inherits<T> for T {
    const IS_SAME_CLASS: bool = true;
}

/// Implements [`Inherits`] for a class and each of its ancestors.
///
/// ```ignore
/// impl_inherits!(Label: Control, CanvasItem, Node, Object);
/// ```
#[macro_export]
macro_rules! impl_inherits {
    ($Derived:ty : $($Base:ty),+ $(,)?) => {
        $(
            // SAFETY: the macro caller lists the engine ancestors of the class.
            unsafe impl $crate::obj::Inherits<$Base> for $Derived {}
        )+
    };
}
