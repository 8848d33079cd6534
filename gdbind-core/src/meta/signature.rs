/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::marker::PhantomData;

use gdbind_ffi as sys;

use crate::lifetime::Scope;
use crate::meta::{Frame, FrameReturn, ParamTuple};
use crate::obj::{Ownership, RawAccess};

/// A full signature for an engine method, used by class APIs to make outbound ptrcalls.
///
/// `Params` is a tuple of [`FrameArg`][crate::meta::FrameArg] types; `Ret` implements [`FrameReturn`].
#[doc(hidden)]
pub struct Signature<Params, Ret> {
    _p: PhantomData<Params>,
    _r: PhantomData<Ret>,
}

impl<'a, Params: ParamTuple<'a>, Ret: FrameReturn> Signature<Params, Ret> {
    /// Make a ptrcall to the engine for a class method. Managed return values go to the ambient scope.
    ///
    /// # Safety
    /// - `method_bind` must expect explicit args `args`, and return a value of type `Ret`.
    /// - `receiver` must be an instance of `class_name`.
    #[inline]
    #[track_caller]
    pub unsafe fn out_class_ptrcall<R: RawAccess + ?Sized>(
        method_bind: sys::ClassMethodBind,
        // Separate parameters to reduce tokens in generated class API.
        class_name: &'static str,
        method_name: &'static str,
        receiver: &R,
        args: Params,
    ) -> Ret {
        Self::out_class_ptrcall_with(
            method_bind,
            class_name,
            method_name,
            receiver,
            args,
            Ret::default_ownership(),
            Scope::ambient(),
        )
    }

    /// Like [`out_class_ptrcall()`](Self::out_class_ptrcall), with explicit return ownership and target scope.
    ///
    /// # Safety
    /// See [`out_class_ptrcall()`](Self::out_class_ptrcall).
    #[track_caller]
    pub unsafe fn out_class_ptrcall_with<R: RawAccess + ?Sized>(
        method_bind: sys::ClassMethodBind,
        class_name: &'static str,
        method_name: &'static str,
        receiver: &R,
        args: Params,
        ownership: Ownership,
        scope: Scope,
    ) -> Ret {
        // sys::out!("out_class_ptrcall: {class_name}::{method_name}");

        let mut frame = Frame::for_method(class_name, method_name);
        args.push_args(&mut frame);

        let ret = frame.ret_with::<Ret>(ownership);
        frame.dispatch(method_bind, receiver);
        frame.get_in(ret, scope)
    }

    /// Make a ptrcall to the engine for a static class method.
    ///
    /// # Safety
    /// `method_bind` must be static, expect explicit args `args`, and return a value of type `Ret`.
    #[inline]
    #[track_caller]
    pub unsafe fn out_static_ptrcall(
        method_bind: sys::ClassMethodBind,
        class_name: &'static str,
        method_name: &'static str,
        args: Params,
    ) -> Ret {
        let mut frame = Frame::for_method(class_name, method_name);
        args.push_args(&mut frame);

        let ret = frame.ret::<Ret>();
        frame.dispatch_static(method_bind);
        frame.get(ret)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tracing for tests

#[cfg(feature = "trace")]
pub mod trace {
    use std::cell::Cell;

    use crate::meta::CallContext;

    /// Stores information about the current call for diagnostic purposes.
    pub struct CallReport {
        pub class: String,
        pub method: String,
        pub is_inbound: bool,
        pub is_ptrcall: bool,
    }

    /// Takes the report of the last call on this thread.
    ///
    /// # Panics
    /// If no call was made since the last `pop()`.
    pub fn pop() -> CallReport {
        let lock = TRACE.take();
        lock.expect("trace::pop() had no prior call stored.")
    }

    pub(crate) fn push(inbound: bool, ptrcall: bool, call_ctx: &CallContext) {
        if call_ctx.function_name.contains("notrace") {
            return;
        }

        let report = CallReport {
            class: call_ctx.class_name.to_string(),
            method: call_ctx.function_name.to_string(),
            is_inbound: inbound,
            is_ptrcall: ptrcall,
        };

        TRACE.set(Some(report));
    }

    thread_local! {
        static TRACE: Cell<Option<CallReport>> = Cell::default();
    }
}
