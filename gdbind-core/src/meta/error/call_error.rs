/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::meta::error::LifetimeError;
use crate::meta::CallContext;
use crate::obj::InstanceId;

/// Error of an outbound ptrcall, raised by the call frame before or after the engine is invoked.
///
/// Allows to inspect the involved class and method via `class_name()` and `method_name()`, if the frame knew its call context.
pub struct CallError {
    // Boxed to keep `Result<T, CallError>` small on the happy path.
    b: Box<InnerCallError>,
}

struct InnerCallError {
    class_name: Option<String>,
    method_name: Option<String>,
    reason: CallErrorReason,
}

/// Why a call failed.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CallErrorReason {
    /// The receiver object has been freed; its instance ID no longer resolves.
    DeadObject { instance_id: InstanceId },

    /// A non-static method was dispatched without receiver.
    NullReceiver,

    /// The frame was already dispatched. Frames serve exactly one call.
    AlreadyDispatched,

    /// A return slot was read before the frame was dispatched.
    NotDispatched,

    /// The return slot belongs to a different frame.
    ForeignSlot,

    /// The return value was already read from the frame.
    ReturnAlreadyTaken,

    /// The engine returned null for a return type that cannot represent it.
    NullReturn,

    /// The number of arguments differs from the class database.
    ArgCountMismatch { expected: usize, actual: usize },

    /// An argument or return handle violated the lifetime rules.
    Lifetime(LifetimeError),
}

impl CallError {
    pub(crate) fn new(call_ctx: Option<&CallContext>, reason: CallErrorReason) -> Self {
        Self {
            b: Box::new(InnerCallError {
                class_name: call_ctx.map(|ctx| ctx.class_name.to_string()),
                method_name: call_ctx.map(|ctx| ctx.function_name.to_string()),
                reason,
            }),
        }
    }

    /// Name of the class whose method was called, if known.
    pub fn class_name(&self) -> Option<&str> {
        self.b.class_name.as_deref()
    }

    /// Name of the called method, if known.
    pub fn method_name(&self) -> Option<&str> {
        self.b.method_name.as_deref()
    }

    pub fn reason(&self) -> &CallErrorReason {
        &self.b.reason
    }
}

impl Error for CallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.b.reason {
            CallErrorReason::Lifetime(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallError")
            .field("class_name", &self.b.class_name)
            .field("method_name", &self.b.method_name)
            .field("reason", &self.b.reason)
            .finish()
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.b.class_name, &self.b.method_name) {
            (Some(class), Some(method)) => write!(f, "{class}::{method}: ")?,
            (None, Some(method)) => write!(f, "{method}: ")?,
            _ => {}
        }

        match &self.b.reason {
            CallErrorReason::DeadObject { instance_id } => {
                write!(f, "object with instance ID {instance_id} has been freed")
            }
            CallErrorReason::NullReceiver => write!(f, "method requires a receiver object"),
            CallErrorReason::AlreadyDispatched => write!(f, "call frame was already dispatched"),
            CallErrorReason::NotDispatched => write!(f, "return value read before dispatch"),
            CallErrorReason::ForeignSlot => write!(f, "return slot belongs to another call frame"),
            CallErrorReason::ReturnAlreadyTaken => write!(f, "return value was already taken"),
            CallErrorReason::NullReturn => write!(f, "engine returned null for a non-nullable object"),
            CallErrorReason::ArgCountMismatch { expected, actual } => {
                write!(f, "expected {expected} arguments, got {actual}")
            }
            CallErrorReason::Lifetime(e) => write!(f, "{e}"),
        }
    }
}
