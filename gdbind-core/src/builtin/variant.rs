/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_ffi as sys;
use sys::VariantType;

use crate::lifetime::{Managed, Scope};

impl_managed_builtin! {
    /// Godot variant type, able to store a variety of different types.
    ///
    /// Occupies three words. `new()` creates a nil variant; other values are produced by the engine.
    pub struct Variant => Variant;
}

impl Variant {
    /// Nil variant, owned by `scope`. Same as [`new_in()`](Self::new_in).
    #[track_caller]
    pub fn nil_in(scope: Scope) -> Self {
        Self::new_in(scope)
    }

    /// Type of the stored value.
    ///
    /// # Panics
    /// If the variant has been released.
    pub fn get_type(&self) -> VariantType {
        let opaque: sys::OpaqueVariant = self.handle().to_opaque();

        // SAFETY: the handle is alive, checked by handle().
        let ty = unsafe { sys::interface_fn!(variant_get_type)(opaque.as_ptr()) };
        VariantType::from_sys(ty).unwrap_or_else(|| panic!("engine returned unknown variant type {ty}"))
    }

    pub fn is_nil(&self) -> bool {
        self.get_type() == VariantType::Nil
    }
}
