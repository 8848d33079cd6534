/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Ownership transfer between the engine and Rust.
//!
//! A handle that crosses the boundary is in one of these states:
//!
//! ```text
//!   Unowned ──> Borrowed ──> Transferred ──> Registered ──> Released
//! ```
//!
//! - **Unowned**: the engine owns the value; Rust only knows its address (engine-owned objects).
//! - **Borrowed**: the value is lent to a call frame as an argument. The frame returns it when it is dropped.
//! - **Transferred**: a return value that the engine handed over to Rust, sitting in a call frame's return slot.
//! - **Registered**: the transferred value is a member of a scope.
//! - **Released**: the scope has ended, or the value was released early or handed back to the engine.

use crate::lifetime::{self, ErasedHandle, Managed, Scope};
use crate::obj::{Gd, GodotClass, ObjectHandle};

/// How a return value's ownership moves across the boundary.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Ownership {
    /// The engine keeps ownership. Rust only gets an engine-owned reference and must not release it.
    Borrowed,

    /// Ownership moves to Rust. The value must be registered in a scope (or explicitly discarded).
    Transferred,
}

/// Registers a value whose ownership the engine handed to Rust.
#[track_caller]
pub fn transferred_to_rust<T: Managed>(handle: ErasedHandle, scope: Scope) -> T {
    T::from_handle_in(handle, scope)
}

/// Removes a value from its scope without releasing it, because the engine takes ownership.
///
/// Returns the raw handle, which must be passed to the engine.
///
/// # Panics
/// If the value has already been released, or is lent to a call frame.
#[track_caller]
pub fn transferred_to_engine<T: Managed>(value: T) -> ErasedHandle {
    lifetime::take(value.key()).unwrap_or_else(|e| panic!("{e}"))
}

/// Refers to an engine-owned object without taking ownership.
pub fn borrowed_from_engine<T: GodotClass>(handle: ObjectHandle) -> Gd<T> {
    Gd::from_engine(handle)
}
