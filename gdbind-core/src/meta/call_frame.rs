/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use gdbind_ffi as sys;
use sys::{ClassMethodBind, HANDLE_WORDS};

use crate::lifetime::{self, ErasedHandle, HandleBits, HandleKey, HandleKind, Scope};
use crate::meta::error::{CallError, CallErrorReason};
use crate::meta::{CallContext, ClassId};
use crate::obj::{finish_transfer, GdInner, Gd, GodotClass, ObjectHandle, Ownership, RawAccess};

/// Words per slot: enough for the largest handle, and for a `Rect2` in double precision.
const SLOT_WORDS: usize = 4;

/// Storage for one argument or the return value of a ptrcall. The engine reads and writes it through a pointer.
pub type Slot = [u64; SLOT_WORDS];

thread_local! {
    static LIVE_FRAMES: Cell<usize> = const { Cell::new(0) };
    static NEXT_FRAME_ID: Cell<u64> = const { Cell::new(1) };
}

/// Number of call frames currently alive on this thread.
///
/// Outside of an engine call, this is 0 unless a frame is leaked.
pub fn live_frames() -> usize {
    LIVE_FRAMES.get()
}

enum RetState {
    Unreserved,
    Reserved {
        ownership: Ownership,
        owned_kind: Option<HandleKind>,
    },
    Taken,
}

/// Argument and return storage for exactly one outbound ptrcall.
///
/// Usage follows a fixed order: push arguments with [`arg()`](Self::arg), reserve the return value with [`ret()`](Self::ret),
/// call [`dispatch()`](Self::dispatch), then read the result with [`get()`](Self::get).
///
/// Arguments are bitwise copies of the caller's handles. Managed arguments are lent to the frame: their scope cannot end
/// while the frame is alive. Dropping the frame returns all borrows and releases temporaries, on every path including panics.
/// An owned return value that was never read is released as well.
///
/// ```no_run
/// # use gdbind_core::meta::Frame;
/// # use gdbind_core::builtin::GString;
/// # fn call(bind: gdbind_ffi::ClassMethodBind, label: &gdbind_core::obj::Gd<gdbind_core::classes::Object>) {
/// let mut frame = Frame::for_method("Label", "get_text");
/// let ret = frame.ret::<GString>();
/// unsafe { frame.dispatch(bind, label) };
/// let text: GString = frame.get(ret);
/// # }
/// ```
pub struct Frame<'a> {
    id: u64,
    call_ctx: Option<CallContext<'static>>,
    args: Vec<Slot>,
    borrowed: Vec<HandleKey>,
    transfers: Vec<(HandleKey, &'a Cell<GdInner>)>,
    temporaries: Vec<ErasedHandle>,
    ret: Slot,
    ret_state: RetState,
    dispatched: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a> Frame<'a> {
    pub fn new() -> Self {
        Self::with_context(None)
    }

    /// Frame for a call to `class_name::method_name`; the names appear in diagnostics.
    pub fn for_method(class_name: &'static str, method_name: &'static str) -> Self {
        Self::with_context(Some(CallContext::outbound(class_name, method_name)))
    }

    fn with_context(call_ctx: Option<CallContext<'static>>) -> Self {
        let id = NEXT_FRAME_ID.get();
        NEXT_FRAME_ID.set(id + 1);
        LIVE_FRAMES.set(LIVE_FRAMES.get() + 1);

        Self {
            id,
            call_ctx,
            args: Vec::new(),
            borrowed: Vec::new(),
            transfers: Vec::new(),
            temporaries: Vec::new(),
            ret: [0; SLOT_WORDS],
            ret_state: RetState::Unreserved,
            dispatched: false,
            _not_send: PhantomData,
        }
    }

    /// Appends an argument.
    ///
    /// # Panics
    /// If the frame was already dispatched, or the argument is no longer accessible.
    #[track_caller]
    pub fn arg<A: FrameArg<'a>>(&mut self, arg: A) -> &mut Self {
        assert!(!self.dispatched, "{self}: argument added after dispatch");

        arg.push_to(self);
        self
    }

    /// Reserves the return slot for a value of type `T`, with the type's default ownership.
    #[track_caller]
    pub fn ret<T: FrameReturn>(&mut self) -> RetSlot<T> {
        self.ret_with::<T>(T::default_ownership())
    }

    /// Reserves the return slot for a value of type `T`, whose ownership moves as specified.
    ///
    /// # Panics
    /// If the return slot is already reserved, or the frame was dispatched.
    #[track_caller]
    pub fn ret_with<T: FrameReturn>(&mut self, ownership: Ownership) -> RetSlot<T> {
        assert!(
            matches!(self.ret_state, RetState::Unreserved),
            "{self}: return slot already reserved"
        );
        assert!(!self.dispatched, "{self}: return slot reserved after dispatch");

        self.ret = [0; SLOT_WORDS];

        // SAFETY: the slot is zeroed and large enough for any frame value.
        unsafe { T::prepare_slot(&mut self.ret) };

        self.ret_state = RetState::Reserved {
            ownership,
            owned_kind: T::owned_kind(ownership),
        };

        RetSlot {
            frame_id: self.id,
            _ty: PhantomData,
        }
    }

    /// Calls a method on `receiver`.
    ///
    /// # Safety
    /// `bind` must take the pushed arguments and write the reserved return type, and `receiver` must be of the bind's class.
    ///
    /// # Panics
    /// If the call cannot be made, see [`try_dispatch()`](Self::try_dispatch).
    #[track_caller]
    pub unsafe fn dispatch<R: RawAccess + ?Sized>(&mut self, bind: ClassMethodBind, receiver: &R) {
        if let Err(e) = self.try_dispatch(bind, receiver) {
            panic!("{e}");
        }
    }

    /// Calls a method on `receiver`, returning an error instead of panicking.
    ///
    /// Fails if the frame was already dispatched or the receiver has been freed.
    ///
    /// # Safety
    /// See [`dispatch()`](Self::dispatch).
    pub unsafe fn try_dispatch<R: RawAccess + ?Sized>(
        &mut self,
        bind: ClassMethodBind,
        receiver: &R,
    ) -> Result<(), CallError> {
        let receiver = (receiver.object_handle(), receiver.handle_key());
        self.dispatch_inner(bind, Some(receiver))
    }

    /// Calls a static method.
    ///
    /// # Safety
    /// `bind` must be a static method taking the pushed arguments and writing the reserved return type.
    #[track_caller]
    pub unsafe fn dispatch_static(&mut self, bind: ClassMethodBind) {
        if let Err(e) = self.dispatch_inner(bind, None) {
            panic!("{e}");
        }
    }

    unsafe fn dispatch_inner(
        &mut self,
        bind: ClassMethodBind,
        receiver: Option<(ObjectHandle, Option<HandleKey>)>,
    ) -> Result<(), CallError> {
        let call_ctx = self.call_ctx.clone();
        let call_ctx = call_ctx.as_ref();

        if self.dispatched {
            return Err(CallError::new(call_ctx, CallErrorReason::AlreadyDispatched));
        }

        let object_ptr = match receiver {
            Some((handle, key)) => {
                if let Some(key) = key {
                    lifetime::borrow(key).map_err(|e| CallError::new(call_ctx, CallErrorReason::Lifetime(e)))?;
                    self.borrowed.push(key);
                }

                handle.validated_ptr(call_ctx)?
            }
            None => ptr::null_mut(),
        };

        self.check_arg_count()?;

        let arg_ptrs: Vec<sys::GDExtensionConstTypePtr> = self
            .args
            .iter()
            .map(|slot| slot.as_ptr() as sys::GDExtensionConstTypePtr)
            .collect();

        #[cfg(feature = "trace")]
        if let Some(call_ctx) = call_ctx {
            crate::meta::trace::push(false, true, call_ctx);
        }

        sys::out!("dispatch {self} with {} args", arg_ptrs.len());
        self.dispatched = true;

        sys::interface_fn!(object_method_bind_ptrcall)(
            bind.0,
            object_ptr,
            arg_ptrs.as_ptr(),
            self.ret.as_mut_ptr() as sys::GDExtensionTypePtr,
        );

        self.finish_transfers()
    }

    /// Reads the return value and registers it in the [ambient scope](Scope::ambient), if it is managed.
    #[track_caller]
    pub fn get<T: FrameReturn>(&mut self, slot: RetSlot<T>) -> T {
        self.get_in(slot, Scope::ambient())
    }

    /// Reads the return value and registers it in `scope`, if it is managed.
    ///
    /// # Panics
    /// See [`try_get_in()`](Self::try_get_in).
    #[track_caller]
    pub fn get_in<T: FrameReturn>(&mut self, slot: RetSlot<T>, scope: Scope) -> T {
        self.try_get_in(slot, scope).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Reads the return value, or fails if the frame was not dispatched, the slot belongs to another frame, the value was already
    /// read, or `scope` has ended (in which case the value is released).
    pub fn try_get_in<T: FrameReturn>(&mut self, slot: RetSlot<T>, scope: Scope) -> Result<T, CallError> {
        let call_ctx = self.call_ctx.clone();
        let error = |reason| CallError::new(call_ctx.as_ref(), reason);

        if slot.frame_id != self.id {
            return Err(error(CallErrorReason::ForeignSlot));
        }

        let ownership = match self.ret_state {
            RetState::Reserved { ownership, .. } => ownership,
            RetState::Taken => return Err(error(CallErrorReason::ReturnAlreadyTaken)),
            RetState::Unreserved => return Err(error(CallErrorReason::ForeignSlot)),
        };

        if !self.dispatched {
            return Err(error(CallErrorReason::NotDispatched));
        }

        // From here on, the value is the decoder's responsibility; it releases it on failure.
        self.ret_state = RetState::Taken;

        // SAFETY: the slot was reserved for T and written by the engine.
        unsafe { T::from_slot(&self.ret, ownership, scope) }.map_err(error)
    }

    /// Releases an owned return value without reading it.
    pub fn discard<T: FrameReturn>(&mut self, slot: RetSlot<T>) {
        debug_assert_eq!(slot.frame_id, self.id, "{self}: discard() with foreign slot");

        if let RetState::Reserved {
            owned_kind: Some(kind),
            ..
        } = self.ret_state
        {
            self.release_return(kind);
        }

        self.ret_state = RetState::Taken;
    }

    /// Ends the frame. Equivalent to dropping it.
    pub fn free(self) {}

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    pub fn call_context(&self) -> Option<&CallContext<'static>> {
        self.call_ctx.as_ref()
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Argument encoding

    /// Appends a plain value, copied bitwise into a slot.
    #[doc(hidden)]
    pub fn push_value<V: Copy>(&mut self, value: V) {
        let mut slot = [0; SLOT_WORDS];
        write_slot(&mut slot, value);
        self.args.push(slot);
    }

    /// Appends a registered handle, lent to this frame until it is dropped.
    #[doc(hidden)]
    #[track_caller]
    pub fn push_borrowed(&mut self, key: HandleKey) {
        let handle = self.borrow_arg(key);
        self.args.push(slot_of(handle.words()));
    }

    /// Appends an object argument: the engine receives a pointer to the object pointer.
    #[track_caller]
    pub(crate) fn push_object(&mut self, handle: ObjectHandle, key: Option<HandleKey>) {
        if let Some(key) = key {
            self.borrow_arg(key);
        }

        let ptr = handle.validated_ptr(self.call_ctx.as_ref()).unwrap_or_else(|e| panic!("{e}"));
        self.push_value(ptr as u64);
    }

    /// Appends an owned object whose ownership moves to the engine once the call succeeds.
    #[track_caller]
    pub(crate) fn push_transfer(&mut self, handle: ObjectHandle, key: HandleKey, cell: &'a Cell<GdInner>) {
        self.push_object(handle, Some(key));
        self.transfers.push((key, cell));
    }

    /// Appends a handle that the frame owns. It is released when the frame is dropped.
    #[doc(hidden)]
    pub fn push_temporary(&mut self, handle: ErasedHandle) {
        self.args.push(slot_of(handle.words()));
        self.temporaries.push(handle);
    }

    #[track_caller]
    fn borrow_arg(&mut self, key: HandleKey) -> HandleBits {
        let handle = lifetime::borrow(key).unwrap_or_else(|e| {
            panic!("{self}: argument {} is not accessible: {e}", self.args.len());
        });

        self.borrowed.push(key);
        handle
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Internals

    /// Hands every transferred argument to the engine. All of them are processed; the first error is returned.
    fn finish_transfers(&mut self) -> Result<(), CallError> {
        let mut first_error = None;

        for (key, cell) in std::mem::take(&mut self.transfers) {
            if let Some(pos) = self.borrowed.iter().position(|&k| k == key) {
                self.borrowed.swap_remove(pos);
            }

            let result = lifetime::unborrow(key)
                .map_err(|e| CallError::new(self.call_ctx.as_ref(), CallErrorReason::Lifetime(e)))
                .and_then(|()| finish_transfer(cell, key));

            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(safeguards_strict)]
    fn check_arg_count(&self) -> Result<(), CallError> {
        let Some(call_ctx) = &self.call_ctx else {
            return Ok(());
        };

        // SAFETY: dispatch requires an initialized binding.
        let class_db = unsafe { sys::class_db() };
        let expected = class_db
            .class(call_ctx.class_name())
            .and_then(|class| {
                class
                    .bindable_methods
                    .iter()
                    .find(|method| method.name == call_ctx.function_name())
            })
            .map(|method| method.arg_count);

        match expected {
            Some(expected) if expected != self.args.len() => Err(CallError::new(
                Some(call_ctx),
                CallErrorReason::ArgCountMismatch {
                    expected,
                    actual: self.args.len(),
                },
            )),
            _ => Ok(()),
        }
    }

    #[cfg(not(safeguards_strict))]
    fn check_arg_count(&self) -> Result<(), CallError> {
        Ok(())
    }

    fn release_return(&mut self, kind: HandleKind) {
        let handle = match kind {
            HandleKind::Object => {
                let ptr = self.ret[0] as sys::GDExtensionObjectPtr;
                if ptr.is_null() {
                    return;
                }

                // SAFETY: non-null object pointer written by the engine, owned by the caller; the slot is cleared below.
                unsafe { ObjectHandle::from_sys(ptr, ClassId::none()).into_erased() }
            }
            // SAFETY: the engine wrote an owned value into the slot; the slot is cleared below.
            kind => unsafe { ErasedHandle::new(kind, handle_words(&self.ret)) },
        };

        self.ret = [0; SLOT_WORDS];
        lifetime::release_handles([handle]);
    }
}

impl Default for Frame<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        for key in std::mem::take(&mut self.borrowed) {
            // Only fails if the scope was force-ended during unwinding; the handle is gone then.
            if let Err(e) = lifetime::unborrow(key) {
                sys::out!("{self}: unborrow failed: {e}");
            }
        }

        if let RetState::Reserved {
            owned_kind: Some(kind),
            ..
        } = self.ret_state
        {
            if self.dispatched {
                crate::godot_error!("{self}: owned return value was never read; releasing it");
            }

            self.release_return(kind);
        }

        lifetime::release_handles(std::mem::take(&mut self.temporaries));
        LIVE_FRAMES.set(LIVE_FRAMES.get() - 1);
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.call_ctx {
            Some(call_ctx) => write!(f, "frame #{} ({call_ctx})", self.id),
            None => write!(f, "frame #{}", self.id),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Typed token for the return value of a frame. Can be redeemed once, at the frame that issued it.
#[must_use = "the return value is released when the frame drops; read it with Frame::get()"]
pub struct RetSlot<T> {
    frame_id: u64,
    _ty: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for RetSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RetSlot(frame #{})", self.frame_id)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Encoding traits

/// Type that can be passed as a ptrcall argument.
pub trait FrameArg<'a> {
    #[doc(hidden)]
    fn push_to(self, frame: &mut Frame<'a>);
}

/// Type that can be read from a ptrcall return slot.
pub trait FrameReturn: Sized {
    /// Ownership used by [`Frame::ret()`].
    #[doc(hidden)]
    fn default_ownership() -> Ownership {
        Ownership::Transferred
    }

    /// Kind of handle that Rust owns after the call, if any. Such values must be registered or released.
    #[doc(hidden)]
    fn owned_kind(_ownership: Ownership) -> Option<HandleKind> {
        None
    }

    /// Initializes the slot before the call. The engine assigns into initialized storage for builtin types.
    #[doc(hidden)]
    unsafe fn prepare_slot(_slot: &mut Slot) {}

    /// Decodes the value after the call. Registers owned values in `scope`, or releases them on failure.
    #[doc(hidden)]
    unsafe fn from_slot(slot: &Slot, ownership: Ownership, scope: Scope) -> Result<Self, CallErrorReason>;
}

/// Argument whose ownership moves to the engine, e.g. a node added as child.
///
/// On a successful call, the pointer becomes engine-owned: it is removed from its scope without being released. Reference-counted
/// objects and already engine-owned pointers are passed like regular arguments.
pub struct TransferToEngine<'a, T: GodotClass>(pub &'a Gd<T>);

/// Handle stored at the start of a slot.
pub(crate) fn handle_words(slot: &Slot) -> [u64; HANDLE_WORDS] {
    let mut words = [0; HANDLE_WORDS];
    words.copy_from_slice(&slot[..HANDLE_WORDS]);
    words
}

fn slot_of(words: &[u64; HANDLE_WORDS]) -> Slot {
    let mut slot = [0; SLOT_WORDS];
    slot[..HANDLE_WORDS].copy_from_slice(words);
    slot
}

pub(crate) fn write_slot<V: Copy>(slot: &mut Slot, value: V) {
    const {
        assert!(
            size_of::<V>() <= SLOT_WORDS * 8 && align_of::<V>() <= 8,
            "type does not fit into a call frame slot"
        )
    };

    // SAFETY: V fits into the slot (checked above), and the slot is 8-aligned.
    unsafe { ptr::write(slot.as_mut_ptr() as *mut V, value) }
}

/// # Safety
/// The slot must hold a valid `V`, e.g. written by the engine for a return of type `V`.
pub(crate) unsafe fn read_slot<V: Copy>(slot: &Slot) -> V {
    const {
        assert!(
            size_of::<V>() <= SLOT_WORDS * 8 && align_of::<V>() <= 8,
            "type does not fit into a call frame slot"
        )
    };

    ptr::read(slot.as_ptr() as *const V)
}

/// Registers an owned return value, releasing it if `scope` has ended.
pub(crate) fn register_return(handle: ErasedHandle, scope: Scope) -> Result<HandleKey, CallErrorReason> {
    scope.try_register(handle).map_err(CallErrorReason::Lifetime)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Impls for primitives and objects

macro_rules! impl_frame_int {
    ($($Int:ty),*) => {
        $(
            impl<'a> FrameArg<'a> for $Int {
                fn push_to(self, frame: &mut Frame<'a>) {
                    // Integers always travel as 64-bit in ptrcalls.
                    frame.push_value(self as i64);
                }
            }

            impl FrameReturn for $Int {
                unsafe fn from_slot(slot: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
                    Ok(read_slot::<i64>(slot) as $Int)
                }
            }
        )*
    };
}

impl_frame_int!(i8, i16, i32, i64, u8, u16, u32);

impl<'a> FrameArg<'a> for u64 {
    fn push_to(self, frame: &mut Frame<'a>) {
        frame.push_value(self);
    }
}

impl FrameReturn for u64 {
    unsafe fn from_slot(slot: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
        Ok(read_slot::<u64>(slot))
    }
}

impl<'a> FrameArg<'a> for f64 {
    fn push_to(self, frame: &mut Frame<'a>) {
        frame.push_value(self);
    }
}

impl FrameReturn for f64 {
    unsafe fn from_slot(slot: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
        Ok(read_slot::<f64>(slot))
    }
}

impl<'a> FrameArg<'a> for f32 {
    fn push_to(self, frame: &mut Frame<'a>) {
        // Floats always travel as 64-bit in ptrcalls.
        frame.push_value(self as f64);
    }
}

impl FrameReturn for f32 {
    unsafe fn from_slot(slot: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
        Ok(read_slot::<f64>(slot) as f32)
    }
}

impl<'a> FrameArg<'a> for bool {
    fn push_to(self, frame: &mut Frame<'a>) {
        frame.push_value(self as u8);
    }
}

impl FrameReturn for bool {
    unsafe fn from_slot(slot: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
        Ok(read_slot::<u8>(slot) != 0)
    }
}

impl FrameReturn for () {
    unsafe fn from_slot(_: &Slot, _: Ownership, _: Scope) -> Result<Self, CallErrorReason> {
        Ok(())
    }
}

impl<'a, T: GodotClass> FrameArg<'a> for &Gd<T> {
    #[track_caller]
    fn push_to(self, frame: &mut Frame<'a>) {
        frame.push_object(self.object_handle(), self.handle_key());
    }
}

impl<'a, T: GodotClass> FrameArg<'a> for Option<&Gd<T>> {
    #[track_caller]
    fn push_to(self, frame: &mut Frame<'a>) {
        match self {
            Some(gd) => gd.push_to(frame),
            None => frame.push_value(0u64),
        }
    }
}

impl<'a, T: GodotClass> FrameArg<'a> for TransferToEngine<'a, T> {
    #[track_caller]
    fn push_to(self, frame: &mut Frame<'a>) {
        let gd = self.0;

        match gd.handle_key() {
            Some(key) if !T::IS_REFCOUNTED => frame.push_transfer(gd.object_handle(), key, gd.inner_cell()),
            _ => gd.push_to(frame),
        }
    }
}

impl<T: GodotClass> FrameReturn for Option<Gd<T>> {
    /// Reference-counted objects come with a reference for the caller; others stay with the engine.
    fn default_ownership() -> Ownership {
        if T::IS_REFCOUNTED {
            Ownership::Transferred
        } else {
            Ownership::Borrowed
        }
    }

    fn owned_kind(ownership: Ownership) -> Option<HandleKind> {
        (ownership == Ownership::Transferred).then_some(HandleKind::Object)
    }

    unsafe fn from_slot(slot: &Slot, ownership: Ownership, scope: Scope) -> Result<Self, CallErrorReason> {
        let ptr = slot[0] as sys::GDExtensionObjectPtr;
        if ptr.is_null() {
            return Ok(None);
        }

        let handle = ObjectHandle::from_sys(ptr, T::class_id());
        let gd = match ownership {
            Ownership::Transferred => Gd::from_owned_key(register_return(handle.into_erased(), scope)?),
            Ownership::Borrowed => Gd::from_engine(handle),
        };

        Ok(Some(gd))
    }
}

impl<T: GodotClass> FrameReturn for Gd<T> {
    fn default_ownership() -> Ownership {
        Option::<Gd<T>>::default_ownership()
    }

    fn owned_kind(ownership: Ownership) -> Option<HandleKind> {
        Option::<Gd<T>>::owned_kind(ownership)
    }

    unsafe fn from_slot(slot: &Slot, ownership: Ownership, scope: Scope) -> Result<Self, CallErrorReason> {
        Option::<Gd<T>>::from_slot(slot, ownership, scope)?.ok_or(CallErrorReason::NullReturn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_roundtrip_primitives() {
        let mut slot = [0; SLOT_WORDS];
        write_slot(&mut slot, -5i64);
        assert_eq!(unsafe { read_slot::<i64>(&slot) }, -5);

        let mut slot = [0; SLOT_WORDS];
        write_slot(&mut slot, 2.5f64);
        assert_eq!(unsafe { read_slot::<f64>(&slot) }, 2.5);

        let mut slot = [0; SLOT_WORDS];
        write_slot(&mut slot, [1.0f32, 2.0, 3.0]);
        assert_eq!(unsafe { read_slot::<[f32; 3]>(&slot) }, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn frames_count_without_engine() {
        let before = live_frames();

        let mut frame = Frame::for_method("Node", "get_child_count");
        frame.arg(3i32).arg(true).arg(1.5f32);
        assert_eq!(frame.arg_count(), 3);
        assert_eq!(live_frames(), before + 1);

        assert_eq!(frame.to_string(), format!("frame #{} (Node::get_child_count)", frame.id));
        frame.free();

        assert_eq!(live_frames(), before);
    }

    #[test]
    fn narrow_ints_widen() {
        let mut frame = Frame::new();
        frame.arg(-1i8).arg(7u32);

        assert_eq!(unsafe { read_slot::<i64>(&frame.args[0]) }, -1);
        assert_eq!(unsafe { read_slot::<i64>(&frame.args[1]) }, 7);
    }

    #[test]
    fn get_before_dispatch_fails() {
        let mut frame = Frame::new();
        let slot = frame.ret::<i64>();

        let err = frame.try_get_in(slot, Scope::root()).unwrap_err();
        assert_eq!(err.reason(), &CallErrorReason::NotDispatched);
    }

    #[test]
    fn slot_of_other_frame_is_rejected() {
        let mut a = Frame::new();
        let mut b = Frame::new();
        let slot_a = a.ret::<bool>();
        let _slot_b = b.ret::<bool>();

        let err = b.try_get_in(slot_a, Scope::root()).unwrap_err();
        assert_eq!(err.reason(), &CallErrorReason::ForeignSlot);
    }
}
