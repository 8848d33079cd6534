/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Lifetimes of engine handles owned by Rust.
//!
//! Every engine value that Rust must eventually free (strings, containers, variants, reference-counted or Rust-created objects) is
//! registered in a [`Scope`]. Ending the scope frees all its members at once. Registered values are addressed by a [`HandleKey`],
//! which fails fast once the value has been released.
//!
//! The registry is thread-local. Scopes and keys are `!Send`, so a handle can only be resolved on the thread that registered it.
//! Handles themselves ([`ErasedHandle`]) are move-only: once registered, the only way to reach the value is through its key.
//!
//! ```no_run
//! use gdbind_core::lifetime::{with_scope, Scope};
//! use gdbind_core::builtin::GString;
//!
//! with_scope(|scope| {
//!     let text = GString::from_str_in(scope, "hello");
//!     // `text` is released when the closure returns.
//! });
//! ```

mod handle;
mod managed;
mod registry;
mod scope;

use std::cell::RefCell;

use gdbind_ffi as sys;

pub use handle::{ErasedHandle, HandleBits, HandleKind};
pub use managed::Managed;
pub(crate) use registry::LifetimeRegistry;
pub use registry::{EndOutcome, HandleKey, HandleState, ScopeId};
pub(crate) use scope::end_root;
pub use scope::{with_scope, LeakPolicy, Scope, ScopeGuard};

use crate::meta::error::LifetimeError;

thread_local! {
    static REGISTRY: RefCell<LifetimeRegistry> = RefCell::new(LifetimeRegistry::new());
}

/// Runs `f` with exclusive access to this thread's registry.
///
/// `f` must not call into the engine, since engine callbacks may re-enter the registry.
pub(crate) fn with_registry<R>(f: impl FnOnce(&mut LifetimeRegistry) -> R) -> R {
    REGISTRY.with(|cell| f(&mut cell.borrow_mut()))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Handle access

/// Returns the handle behind `key`.
///
/// # Panics
/// If the handle has been released, either because its scope ended or because it was released early or handed to the engine.
#[track_caller]
pub fn get(key: HandleKey) -> HandleBits {
    try_get(key).unwrap_or_else(|e| panic!("{e}"))
}

/// Returns the handle behind `key`, or the reason why it is no longer accessible.
pub fn try_get(key: HandleKey) -> Result<HandleBits, LifetimeError> {
    with_registry(|reg| reg.get(key))
}

/// Current state of a registered handle.
pub fn handle_state(key: HandleKey) -> HandleState {
    with_registry(|reg| reg.state(key))
}

/// Releases a single handle before its scope ends.
///
/// # Panics
/// If the handle is already released, or currently lent to a call frame.
#[track_caller]
pub fn release(key: HandleKey) {
    if let Err(e) = try_release(key) {
        panic!("{e}");
    }
}

pub fn try_release(key: HandleKey) -> Result<(), LifetimeError> {
    let handle = with_registry(|reg| reg.remove(key))?;
    release_handles([handle]);

    Ok(())
}

/// Removes a handle from its scope without releasing it, because ownership moves to the engine.
pub(crate) fn take(key: HandleKey) -> Result<ErasedHandle, LifetimeError> {
    with_registry(|reg| reg.remove(key))
}

pub(crate) fn borrow(key: HandleKey) -> Result<HandleBits, LifetimeError> {
    with_registry(|reg| reg.borrow(key))
}

pub(crate) fn unborrow(key: HandleKey) -> Result<(), LifetimeError> {
    with_registry(|reg| reg.unborrow(key))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Introspection

/// Number of handles registered on this thread, across all open scopes.
pub fn live_handles() -> usize {
    with_registry(|reg| reg.live_count())
}

/// Number of open scopes on this thread, including the root scope once it has been created.
pub fn open_scopes() -> usize {
    with_registry(|reg| reg.open_scope_count())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Release

/// Frees handles that have already been removed from the registry.
pub(crate) fn release_handles(handles: impl IntoIterator<Item = ErasedHandle>) {
    if !sys::is_initialized() {
        let leaked = handles.into_iter().count();
        if leaked > 0 {
            eprintln!("WARNING: engine binding not initialized; leaking {leaked} handles");
        }
        return;
    }

    for handle in handles {
        // SAFETY: binding is initialized; the handle was removed from the registry, so nobody else can reach it.
        unsafe { handle.release() };
    }
}
