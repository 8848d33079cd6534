/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine classes that the marshaling layer itself relies on.
//!
//! Every class comes with two traits: `<Class>Raw`, implemented for [`Raw`][crate::obj::Raw] projections and taking explicit
//! scopes; and `<Class>Api`, implemented for all [`ErgonomicAccess`][crate::obj::ErgonomicAccess] types and returning Rust values.
//! Further classes are written in the same shape, one module per class.

mod object;
pub(crate) mod ref_counted;

pub use object::{Object, ObjectApi, ObjectRaw};
pub use ref_counted::{RefCounted, RefCountedApi, RefCountedRaw};
