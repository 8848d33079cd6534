/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Types and traits related to objects.
//!
//! The most important symbols in this module are:
//! - [`GodotClass`], which is implemented for every class that engine objects can have.
//! - [`Gd`], a smart pointer to an engine object, either owned through a scope or owned by the engine.
//! - [`RawAccess`] and [`ErgonomicAccess`], the two ways of calling class methods.

mod access;
mod casts;
mod gd;
mod instance_id;
mod object_handle;
mod traits;

pub mod ownership;

pub use access::{ErgonomicAccess, Raw, RawAccess, View};
pub use gd::Gd;
pub(crate) use gd::{finish_transfer, GdInner};
pub use instance_id::InstanceId;
pub use object_handle::ObjectHandle;
pub use ownership::Ownership;
pub use traits::{GodotClass, Inherits, NoBase};
