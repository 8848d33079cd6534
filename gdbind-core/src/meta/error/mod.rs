/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Errors of the marshaling layer.
//!
//! Most APIs panic on these errors, since they indicate a bug in the calling code. `try_*` variants return them instead.

mod call_error;
mod class_registry_error;
mod lifetime_error;

pub use call_error::*;
pub use class_registry_error::*;
pub use lifetime_error::*;
