/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;
use sys::VariantType;

pub type BuiltinDestructor = unsafe extern "C" fn(p_base: sys::GDExtensionTypePtr);
pub type BuiltinConstructor = unsafe extern "C" fn(
    p_base: sys::GDExtensionUninitializedTypePtr,
    p_args: *const sys::GDExtensionConstTypePtr,
);

/// Default constructors and destructors of builtin types that own engine memory.
///
/// Loaded eagerly together with the interface, because releasing a handle must never depend on a lazy lookup that could fail.
pub struct BuiltinLifecycleTable {
    destructors: [Option<BuiltinDestructor>; VariantType::COUNT],
    default_constructors: [Option<BuiltinConstructor>; VariantType::COUNT],
}

impl BuiltinLifecycleTable {
    /// # Safety
    /// `interface` must contain valid engine functions.
    pub unsafe fn load(interface: &sys::EngineInterface) -> Self {
        let get_destructor = validate(interface.variant_get_ptr_destructor, "variant_get_ptr_destructor");
        let get_constructor = validate(interface.variant_get_ptr_constructor, "variant_get_ptr_constructor");

        let mut destructors = [None; VariantType::COUNT];
        let mut default_constructors = [None; VariantType::COUNT];

        for ordinal in 0..VariantType::COUNT as i32 {
            let Some(ty) = VariantType::from_sys(ordinal) else {
                continue;
            };

            if !ty.needs_destructor() {
                continue;
            }

            let destructor = get_destructor(ty.sys());
            destructors[ty.ordinal()] = Some(validate(destructor, &format!("{ty:?} destructor")));

            // Constructor index 0 is the default constructor for all builtin types.
            let constructor = get_constructor(ty.sys(), 0);
            default_constructors[ty.ordinal()] =
                Some(validate(constructor, &format!("{ty:?} default constructor")));
        }

        Self {
            destructors,
            default_constructors,
        }
    }

    /// Destructor for a builtin type that owns engine memory.
    ///
    /// # Panics
    /// If `ty` has no destructor (plain values such as `int` or `Vector2`).
    pub fn destructor(&self, ty: VariantType) -> BuiltinDestructor {
        self.destructors[ty.ordinal()]
            .unwrap_or_else(|| panic!("builtin type {ty:?} has no destructor"))
    }

    /// Default constructor for a builtin type that owns engine memory.
    ///
    /// # Panics
    /// If `ty` is a plain value type.
    pub fn default_constructor(&self, ty: VariantType) -> BuiltinConstructor {
        self.default_constructors[ty.ordinal()]
            .unwrap_or_else(|| panic!("builtin type {ty:?} has no default constructor"))
    }
}

fn validate<T>(function: Option<T>, description: &str) -> T {
    function.unwrap_or_else(|| {
        panic!("Failed to load builtin lifecycle function {description}.{}", sys::toolbox::INFO)
    })
}
