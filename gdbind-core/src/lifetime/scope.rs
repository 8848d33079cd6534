/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use gdbind_ffi as sys;

use crate::lifetime::{release_handles, with_registry, EndOutcome, ErasedHandle, HandleKey, ScopeId};
use crate::meta::error::LifetimeError;

thread_local! {
    /// Scopes entered through `with_scope()` or `ScopeGuard::enter()`, innermost last.
    static AMBIENT: RefCell<Vec<ScopeId>> = const { RefCell::new(Vec::new()) };

    /// Per-thread fallback scope, created lazily. Ended at library shutdown for the main thread.
    static ROOT: Cell<Option<ScopeId>> = const { Cell::new(None) };
}

/// Group of engine handles that are released together.
///
/// A scope is a cheap `Copy` token; the handles live in the thread-local registry. Ending a scope releases all its members and is
/// final: handles registered in it fail fast afterwards, and it cannot be reopened. Ending an already ended scope does nothing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Scope {
    id: ScopeId,
    _not_send: PhantomData<*const ()>,
}

impl Scope {
    /// Opens a new scope.
    pub fn begin() -> Self {
        Self::from_id(with_registry(|reg| reg.begin(None)))
    }

    /// Opens a new scope with a label that shows up in diagnostics.
    pub fn begin_labeled(label: impl Into<Cow<'static, str>>) -> Self {
        let label = label.into();
        Self::from_id(with_registry(|reg| reg.begin(Some(label))))
    }

    /// The scope that lives until the library is unloaded.
    ///
    /// Values registered here are released at shutdown, according to the library's [`LeakPolicy`].
    pub fn root() -> Self {
        let id = ROOT.get().unwrap_or_else(|| {
            let id = with_registry(|reg| reg.begin(Some(Cow::Borrowed("root"))));
            ROOT.set(Some(id));
            id
        });

        Self::from_id(id)
    }

    /// Innermost scope entered via [`with_scope()`] or [`ScopeGuard::enter()`]; the [root scope](Self::root) if there is none.
    ///
    /// Functions that create engine values without an explicit scope register them here.
    pub fn ambient() -> Self {
        match AMBIENT.with_borrow(|stack| stack.last().copied()) {
            Some(id) => Self::from_id(id),
            None => Self::root(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        with_registry(|reg| reg.is_open(self.id))
    }

    /// Number of handles currently registered; 0 once ended.
    pub fn len(&self) -> usize {
        with_registry(|reg| reg.scope_len(self.id))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn label(&self) -> Option<String> {
        with_registry(|reg| reg.label(self.id).map(str::to_owned))
    }

    /// Takes ownership of an engine handle until this scope ends.
    ///
    /// # Panics
    /// If the scope has already ended. The handle is released before panicking.
    #[track_caller]
    pub fn register(&self, handle: ErasedHandle) -> HandleKey {
        self.try_register(handle).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Like [`register()`](Self::register), but returns an error instead of panicking.
    ///
    /// On error, the handle is released immediately.
    pub fn try_register(&self, handle: ErasedHandle) -> Result<HandleKey, LifetimeError> {
        with_registry(|reg| reg.register(self.id, handle)).map_err(|(e, handle)| {
            release_handles([handle]);
            e
        })
    }

    /// Ends the scope, releasing all its handles. Returns how many were released.
    ///
    /// Ending a scope that already ended is a no-op and returns [`EndOutcome::AlreadyEnded`].
    ///
    /// # Panics
    /// If one of the handles is still lent to a call frame. While unwinding from another panic, such handles are leaked instead,
    /// and the rest is released.
    #[track_caller]
    pub fn end(self) -> EndOutcome {
        match self.try_end() {
            Ok(outcome) => outcome,
            Err(e) if std::thread::panicking() => {
                let (handles, leaked) = with_registry(|reg| reg.end_forced(self.id));
                let released = handles.len();
                release_handles(handles);

                crate::godot_error!("{e}; leaking {leaked} borrowed handle(s) during unwind");
                EndOutcome::Ended(released)
            }
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_end(self) -> Result<EndOutcome, LifetimeError> {
        match with_registry(|reg| reg.end(self.id))? {
            EndOutcome::Ended(handles) => {
                let released = handles.len();
                sys::out!("end scope {}: release {released} handles", self.id);

                release_handles(handles);
                Ok(EndOutcome::Ended(released))
            }
            EndOutcome::AlreadyEnded => {
                sys::out!("end scope {}: already ended", self.id);
                Ok(EndOutcome::AlreadyEnded)
            }
        }
    }

    /// Returns a guard that ends this scope when dropped.
    pub fn guard(self) -> ScopeGuard {
        ScopeGuard {
            scope: self,
            ambient: false,
        }
    }

    fn from_id(id: ScopeId) -> Self {
        Self {
            id,
            _not_send: PhantomData,
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Ends its scope when dropped, including during unwinding.
#[must_use = "dropping the guard ends the scope immediately"]
pub struct ScopeGuard {
    scope: Scope,
    ambient: bool,
}

impl ScopeGuard {
    /// Opens a new scope, ended when the guard is dropped.
    pub fn new() -> Self {
        Scope::begin().guard()
    }

    /// Opens a new scope and makes it the [ambient scope](Scope::ambient) until the guard is dropped.
    pub fn enter() -> Self {
        let scope = Scope::begin();
        AMBIENT.with_borrow_mut(|stack| stack.push(scope.id));

        Self { scope, ambient: true }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl Default for ScopeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.ambient {
            AMBIENT.with_borrow_mut(|stack| {
                // Guards usually drop in LIFO order; tolerate the rest.
                if let Some(pos) = stack.iter().rposition(|&id| id == self.scope.id) {
                    stack.remove(pos);
                }
            });
        }

        self.scope.end();
    }
}

/// Runs `f` inside a fresh ambient scope, which is ended when `f` returns or panics.
pub fn with_scope<R>(f: impl FnOnce(Scope) -> R) -> R {
    let guard = ScopeGuard::enter();
    f(guard.scope())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Shutdown

/// What happens to handles still registered in the root scope when the library is unloaded.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum LeakPolicy {
    /// Release them silently.
    Release,

    /// Print a warning with their number, then release them.
    #[default]
    WarnAndRelease,

    /// Forget them without calling into the engine.
    Leak,
}

/// Ends this thread's root scope. A later [`Scope::root()`] opens a new one.
///
/// Returns the number of handles that were still registered.
pub(crate) fn end_root(policy: LeakPolicy) -> usize {
    let Some(id) = ROOT.take() else {
        return 0;
    };

    let (handles, leaked_borrows) = with_registry(|reg| reg.end_forced(id));
    let remaining = handles.len() + leaked_borrows;

    match policy {
        LeakPolicy::Release => release_handles(handles),
        LeakPolicy::WarnAndRelease => {
            if remaining > 0 {
                crate::godot_warn!("{remaining} engine handle(s) still registered in the root scope at shutdown; releasing them");
            }
            release_handles(handles);
        }
        LeakPolicy::Leak => {
            sys::out!("leak {remaining} root scope handles at shutdown");
        }
    }

    remaining
}
