/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::lifetime::{HandleKey, HandleKind, ScopeId};

/// Misuse of a scope or a registered handle.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LifetimeError {
    /// The handle's scope has ended, so the handle has been released.
    UseAfterEnd { key: HandleKey },

    /// The handle was released early or handed over to the engine, while its scope is still open.
    UseAfterRelease { key: HandleKey },

    /// A handle was registered into a scope that has already ended.
    RegisterIntoEnded { scope: ScopeId, kind: HandleKind },

    /// A scope was ended while some of its handles are lent to call frames.
    EndWhileBorrowed { scope: ScopeId, borrowed: usize },

    /// A handle was released while lent to call frames.
    HandleBorrowed { key: HandleKey, borrows: u32 },
}

impl LifetimeError {
    /// Scope that the error refers to.
    pub fn scope(&self) -> ScopeId {
        match self {
            Self::UseAfterEnd { key } | Self::UseAfterRelease { key } | Self::HandleBorrowed { key, .. } => {
                key.scope_id()
            }
            Self::RegisterIntoEnded { scope, .. } | Self::EndWhileBorrowed { scope, .. } => *scope,
        }
    }
}

impl Error for LifetimeError {}

impl fmt::Display for LifetimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseAfterEnd { key } => {
                write!(f, "use after end: {key} was released when its scope ended")
            }
            Self::UseAfterRelease { key } => {
                write!(f, "use after release: {key} was released or handed to the engine")
            }
            Self::RegisterIntoEnded { scope, kind } => {
                write!(f, "cannot register {kind:?} handle: scope {scope} has already ended")
            }
            Self::EndWhileBorrowed { scope, borrowed } => {
                write!(f, "cannot end scope {scope}: {borrowed} of its handles are lent to call frames")
            }
            Self::HandleBorrowed { key, borrows } => {
                write!(f, "cannot release {key}: it is lent to {borrows} call frame(s)")
            }
        }
    }
}
