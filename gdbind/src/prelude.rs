/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub use super::builtin::{
    real, Array, Color, Dictionary, GString, PackedByteArray, PackedStringArray, Rect2, StringName, Variant, Vector2,
    Vector3,
};
pub use super::classes::{Object, RefCounted};
pub use super::init::{ExtensionLibrary, InitLevel};
pub use super::lifetime::{with_scope, LeakPolicy, Managed, Scope, ScopeGuard};
pub use super::meta::{Frame, Signature, TransferToEngine};
pub use super::obj::{ErgonomicAccess, Gd, GodotClass, Inherits, InstanceId, Ownership, Raw, RawAccess, View};
pub use super::{entry_point, godot_error, godot_print, godot_warn};

// Make trait methods available.
#[rustfmt::skip] // One per line.
mod trait_reexports {
    pub use crate::classes::ObjectApi as _;
    pub use crate::classes::ObjectRaw as _;
    pub use crate::classes::RefCountedApi as _;
    pub use crate::classes::RefCountedRaw as _;
}

pub use trait_reexports::*;
