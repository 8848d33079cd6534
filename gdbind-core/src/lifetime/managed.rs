/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::lifetime::{self, ErasedHandle, HandleBits, HandleKey, HandleKind, HandleState, Scope, ScopeId};
use crate::meta::error::LifetimeError;

/// Rust value that stands for an engine handle registered in a [`Scope`].
///
/// The value itself is only a key. Copying the underlying handle, passing it to the engine, or releasing it goes through the
/// registry, which fails fast once the handle is gone.
pub trait Managed: Sized {
    /// Kind of handle that backs this type.
    const KIND: HandleKind;

    #[doc(hidden)]
    fn from_key(key: HandleKey) -> Self;

    fn key(&self) -> HandleKey;

    /// Takes ownership of `handle`, registering it in `scope`.
    ///
    /// # Panics
    /// If `scope` has ended (the handle is released first), or if the handle kind does not match.
    #[track_caller]
    fn from_handle_in(handle: ErasedHandle, scope: Scope) -> Self {
        assert_eq!(handle.kind(), Self::KIND, "handle kind mismatch");
        Self::from_key(scope.register(handle))
    }

    fn scope_id(&self) -> ScopeId {
        self.key().scope_id()
    }

    /// Raw words of the current engine handle. Ownership stays with the scope.
    ///
    /// # Panics
    /// If the value has been released.
    #[track_caller]
    fn handle(&self) -> HandleBits {
        lifetime::get(self.key())
    }

    fn try_handle(&self) -> Result<HandleBits, LifetimeError> {
        lifetime::try_get(self.key())
    }

    fn state(&self) -> HandleState {
        lifetime::handle_state(self.key())
    }

    /// Whether the value can still be used.
    fn is_alive(&self) -> bool {
        self.state() != HandleState::Released
    }

    /// Releases the value now instead of at the end of its scope.
    ///
    /// # Panics
    /// If the value was already released, or is lent to a call frame.
    #[track_caller]
    fn release(self) {
        lifetime::release(self.key())
    }
}
