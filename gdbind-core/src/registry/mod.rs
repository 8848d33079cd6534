/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Registration of classes and their virtual methods.
//!
//! Classes are registered during the init level callbacks of the [`ExtensionLibrary`][crate::init::ExtensionLibrary]. Once a
//! level has been loaded, the registry is frozen: later registrations fail, and lookups are read-only.

pub mod class;
pub mod virtuals;

pub use class::{ClassRecord, ClassRegistrar, ClassRegistry, ConstructThunk};
pub use virtuals::{VirtualFn, VirtualMethodId, VirtualTable, VirtualTableBuilder};
