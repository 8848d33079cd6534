/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Meta-information about engine calls: call frames, signatures, class IDs and errors.
//!
//! # Calling the engine
//! An outbound ptrcall goes through a [`Frame`]: arguments are copied into argument slots, the return slot is reserved with its
//! expected type, the engine is invoked exactly once, and the decoded return value is registered in a scope. Dropping the frame
//! returns every borrow, whether the call succeeded or not.
//!
//! [`Signature`] wraps these steps for a fixed parameter tuple and return type, which is what generated class APIs use.

mod call_frame;
mod class_id;
mod param_tuple;
mod signature;

pub mod error;

use std::borrow::Cow;
use std::fmt;

pub use call_frame::{live_frames, Frame, FrameArg, FrameReturn, RetSlot, Slot, TransferToEngine};
pub(crate) use call_frame::{handle_words, read_slot, register_return, write_slot};
pub use class_id::{cleanup as class_id_cleanup, ClassId};
pub use param_tuple::ParamTuple;
pub use signature::Signature;

#[cfg(feature = "trace")]
pub use signature::trace;

/// Class and method of a call, for diagnostics.
// Lazy Display, so we don't create tens of thousands of extra string literals.
#[derive(Clone, Debug)]
pub struct CallContext<'a> {
    pub(crate) class_name: Cow<'a, str>,
    pub(crate) function_name: &'a str,
}

impl<'a> CallContext<'a> {
    /// Outbound call from Rust into the engine.
    pub const fn outbound(class_name: &'a str, function_name: &'a str) -> Self {
        Self {
            class_name: Cow::Borrowed(class_name),
            function_name,
        }
    }

    /// Call from the engine into a Rust virtual method.
    pub const fn virtual_method(class_name: &'a str, function_name: &'a str) -> Self {
        Self::outbound(class_name, function_name)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn function_name(&self) -> &str {
        self.function_name
    }
}

impl fmt::Display for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.function_name)
    }
}
