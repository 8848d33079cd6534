/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

impl_managed_builtin! {
    /// Godot's `Array` type, untyped.
    ///
    /// Arrays are reference-counted in the engine. Each Rust `Array` value owns one reference, released when its scope ends.
    /// Elements are accessed through engine methods that take the array as argument.
    pub struct Array => Array;
}

impl_managed_builtin! {
    /// Godot's `Dictionary` type.
    ///
    /// Like [`Array`], one Rust value owns one engine reference.
    pub struct Dictionary => Dictionary;
}
