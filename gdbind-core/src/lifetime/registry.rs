/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine-independent bookkeeping of scopes and the handles registered in them.
//!
//! The registry never talks to the engine. Operations that free handles return them to the caller, which releases them after
//! the registry borrow has ended. This keeps engine callbacks that re-enter the registry from observing a half-updated state.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::lifetime::{ErasedHandle, HandleBits, HandleKind};
use crate::meta::error::LifetimeError;

/// Scope IDs are unique across all threads, so a key can never match a scope of another thread's registry.
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique ID of a scope. Never reused, and `!Send` like the scope itself.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ScopeId {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl ScopeId {
    fn next() -> Self {
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            _not_send: PhantomData,
        }
    }

    pub fn to_u64(self) -> u64 {
        self.id
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Key of a registered handle.
///
/// Generational: once the handle is released, the slot may be reused, but a stale key never resolves to the new occupant.
/// Keys are `!Send`, since they only resolve in the registry of the thread that created them.
///
/// ```compile_fail
/// # use gdbind_core::lifetime::HandleKey;
/// fn send_to_worker(key: HandleKey) {
///     std::thread::spawn(move || gdbind_core::lifetime::release(key));
/// }
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct HandleKey {
    index: u32,
    generation: u32,
    scope: ScopeId,
    kind: HandleKind,
}

impl HandleKey {
    pub fn scope_id(&self) -> ScopeId {
        self.scope
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} handle {}v{} in scope {}", self.kind, self.index, self.generation, self.scope)
    }
}

/// Observable state of a registered handle.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HandleState {
    /// Registered in an open scope and not lent to any call frame.
    Registered,

    /// Registered, and currently lent to the given number of call frames.
    Borrowed(u32),

    /// No longer accessible: released early, released at scope end, or handed over to the engine.
    Released,
}

/// Result of ending a scope.
#[derive(Debug)]
pub enum EndOutcome<H = usize> {
    /// The scope was open and is now ended; holds the released handles (or their count, in public APIs).
    Ended(H),

    /// The scope had already been ended. Nothing happened.
    AlreadyEnded,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

struct Occupant {
    handle: ErasedHandle,
    scope: ScopeId,
    borrows: u32,
}

struct Slot {
    generation: u32,
    occupant: Option<Occupant>,
}

struct ScopeRecord {
    label: Option<Cow<'static, str>>,
    members: BTreeSet<u32>,
}

/// Generational arena of handles, grouped by scope.
pub(crate) struct LifetimeRegistry {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    scopes: HashMap<ScopeId, ScopeRecord>,
    live: usize,
}

impl LifetimeRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            scopes: HashMap::new(),
            live: 0,
        }
    }

    pub fn begin(&mut self, label: Option<Cow<'static, str>>) -> ScopeId {
        let id = ScopeId::next();

        self.scopes.insert(
            id,
            ScopeRecord {
                label,
                members: BTreeSet::new(),
            },
        );

        id
    }

    pub fn is_open(&self, scope: ScopeId) -> bool {
        self.scopes.contains_key(&scope)
    }

    pub fn label(&self, scope: ScopeId) -> Option<&str> {
        self.scopes.get(&scope)?.label.as_deref()
    }

    /// Number of handles currently registered in `scope`; 0 for ended scopes.
    pub fn scope_len(&self, scope: ScopeId) -> usize {
        self.scopes.get(&scope).map_or(0, |record| record.members.len())
    }

    /// Number of handles registered in any scope.
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn open_scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Registers `handle` as a member of `scope`.
    ///
    /// On error, the handle is handed back, since it remains the caller's responsibility.
    pub fn register(
        &mut self,
        scope: ScopeId,
        handle: ErasedHandle,
    ) -> Result<HandleKey, (LifetimeError, ErasedHandle)> {
        let Some(record) = self.scopes.get_mut(&scope) else {
            let error = LifetimeError::RegisterIntoEnded {
                scope,
                kind: handle.kind(),
            };
            return Err((error, handle));
        };

        let kind = handle.kind();
        let occupant = Occupant {
            handle,
            scope,
            borrows: 0,
        };

        let index = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                debug_assert!(slot.occupant.is_none());

                slot.occupant = Some(occupant);
                index
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("handle registry exceeded u32::MAX slots");
                self.slots.push(Slot {
                    generation: 0,
                    occupant: Some(occupant),
                });
                index
            }
        };

        record.members.insert(index);
        self.live += 1;

        Ok(HandleKey {
            index,
            generation: self.slots[index as usize].generation,
            scope,
            kind,
        })
    }

    pub fn get(&self, key: HandleKey) -> Result<HandleBits, LifetimeError> {
        self.occupant(key).map(|occupant| occupant.handle.bits())
    }

    pub fn state(&self, key: HandleKey) -> HandleState {
        match self.occupant(key) {
            Ok(Occupant { borrows: 0, .. }) => HandleState::Registered,
            Ok(occupant) => HandleState::Borrowed(occupant.borrows),
            Err(_) => HandleState::Released,
        }
    }

    /// Lends the handle to a call frame. Must be paired with [`unborrow()`](Self::unborrow).
    pub fn borrow(&mut self, key: HandleKey) -> Result<HandleBits, LifetimeError> {
        let occupant = self.occupant_mut(key)?;
        occupant.borrows += 1;

        Ok(occupant.handle.bits())
    }

    pub fn unborrow(&mut self, key: HandleKey) -> Result<(), LifetimeError> {
        let occupant = self.occupant_mut(key)?;

        debug_assert!(occupant.borrows > 0, "unborrow() without borrow() for {key}");
        occupant.borrows = occupant.borrows.saturating_sub(1);

        Ok(())
    }

    /// Removes a single handle from its scope and returns it.
    ///
    /// The caller decides whether the handle is released or was handed to the engine. Refused while the handle is borrowed.
    pub fn remove(&mut self, key: HandleKey) -> Result<ErasedHandle, LifetimeError> {
        let occupant = self.occupant(key)?;
        if occupant.borrows > 0 {
            return Err(LifetimeError::HandleBorrowed {
                key,
                borrows: occupant.borrows,
            });
        }

        if let Some(record) = self.scopes.get_mut(&key.scope) {
            record.members.remove(&key.index);
        }

        Ok(self.vacate(key.index))
    }

    /// Ends `scope`, returning all its handles in registration slot order.
    ///
    /// If any member is still borrowed, nothing changes and an error is returned.
    pub fn end(&mut self, scope: ScopeId) -> Result<EndOutcome<Vec<ErasedHandle>>, LifetimeError> {
        let Some(record) = self.scopes.get(&scope) else {
            return Ok(EndOutcome::AlreadyEnded);
        };

        let borrowed = record
            .members
            .iter()
            .filter(|&&index| self.slots[index as usize].occupant.as_ref().is_some_and(|o| o.borrows > 0))
            .count();

        if borrowed > 0 {
            return Err(LifetimeError::EndWhileBorrowed { scope, borrowed });
        }

        let record = self.scopes.remove(&scope).expect("scope present");
        let handles = record.members.into_iter().map(|index| self.vacate(index)).collect();

        Ok(EndOutcome::Ended(handles))
    }

    /// Ends `scope` even if members are borrowed. Borrowed members are forgotten instead of returned.
    ///
    /// Used while unwinding, when frames holding the borrows may already be gone.
    pub fn end_forced(&mut self, scope: ScopeId) -> (Vec<ErasedHandle>, usize) {
        let Some(record) = self.scopes.remove(&scope) else {
            return (Vec::new(), 0);
        };

        let mut released = Vec::with_capacity(record.members.len());
        let mut leaked = 0;

        for index in record.members {
            let borrowed = self.slots[index as usize].occupant.as_ref().is_some_and(|o| o.borrows > 0);
            let handle = self.vacate(index);

            if borrowed {
                leaked += 1;
            } else {
                released.push(handle);
            }
        }

        (released, leaked)
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------

    fn occupant(&self, key: HandleKey) -> Result<&Occupant, LifetimeError> {
        match self.slots.get(key.index as usize) {
            Some(Slot {
                generation,
                occupant: Some(occupant),
            }) if *generation == key.generation && occupant.scope == key.scope => Ok(occupant),
            _ => Err(self.dead_key_error(key)),
        }
    }

    fn occupant_mut(&mut self, key: HandleKey) -> Result<&mut Occupant, LifetimeError> {
        let error = self.dead_key_error(key);

        match self.slots.get_mut(key.index as usize) {
            Some(Slot {
                generation,
                occupant: Some(occupant),
            }) if *generation == key.generation && occupant.scope == key.scope => Ok(occupant),
            _ => Err(error),
        }
    }

    /// Error for a key that no longer resolves. Only meaningful if the key is indeed dead.
    fn dead_key_error(&self, key: HandleKey) -> LifetimeError {
        if self.is_open(key.scope) {
            LifetimeError::UseAfterRelease { key }
        } else {
            LifetimeError::UseAfterEnd { key }
        }
    }

    fn vacate(&mut self, index: u32) -> ErasedHandle {
        let slot = &mut self.slots[index as usize];
        let occupant = slot.occupant.take().expect("vacate() on empty slot");

        // Slots with an exhausted generation are retired; stale keys must never match a new occupant.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free_slots.push(index);
        }
        self.live -= 1;

        occupant.handle
    }
}

impl Drop for LifetimeRegistry {
    fn drop(&mut self) {
        // Thread-local teardown: the engine may already be gone, so leftover handles are reported, not released.
        if self.live > 0 {
            eprintln!(
                "WARNING: thread exited with {} engine handles in {} open scopes; they are leaked",
                self.live,
                self.scopes.len()
            );
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: u64) -> ErasedHandle {
        // SAFETY: test values never reach the engine.
        unsafe { ErasedHandle::new(HandleKind::String, [n, 0, 0]) }
    }

    fn released(outcome: EndOutcome<Vec<ErasedHandle>>) -> Vec<ErasedHandle> {
        match outcome {
            EndOutcome::Ended(handles) => handles,
            EndOutcome::AlreadyEnded => panic!("scope unexpectedly ended already"),
        }
    }

    #[test]
    fn end_returns_each_member_once() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);

        reg.register(scope, handle(1)).unwrap();
        reg.register(scope, handle(2)).unwrap();
        assert_eq!(reg.scope_len(scope), 2);

        let handles = released(reg.end(scope).unwrap());
        assert_eq!(handles, vec![handle(1), handle(2)]);
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn second_end_is_noop() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(Some("twice".into()));
        reg.register(scope, handle(1)).unwrap();

        assert_eq!(released(reg.end(scope).unwrap()).len(), 1);
        assert!(matches!(reg.end(scope), Ok(EndOutcome::AlreadyEnded)));
    }

    #[test]
    fn get_after_end_fails_fast() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);
        let key = reg.register(scope, handle(7)).unwrap();

        assert_eq!(reg.get(key), Ok(handle(7).bits()));
        reg.end(scope).unwrap();

        assert_eq!(reg.get(key), Err(LifetimeError::UseAfterEnd { key }));
        assert_eq!(reg.state(key), HandleState::Released);
    }

    #[test]
    fn register_into_ended_scope_is_refused() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);
        reg.end(scope).unwrap();

        let (err, handed_back) = reg.register(scope, handle(1)).unwrap_err();
        assert_eq!(handed_back, handle(1));
        assert_eq!(
            err,
            LifetimeError::RegisterIntoEnded {
                scope,
                kind: HandleKind::String
            }
        );
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn stale_key_does_not_resolve_reused_slot() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);

        let old = reg.register(scope, handle(1)).unwrap();
        assert_eq!(reg.remove(old), Ok(handle(1)));

        let new = reg.register(scope, handle(2)).unwrap();
        assert_ne!(old, new);

        assert_eq!(reg.get(old), Err(LifetimeError::UseAfterRelease { key: old }));
        assert_eq!(reg.get(new), Ok(handle(2).bits()));
    }

    #[test]
    fn scopes_are_independent() {
        let mut reg = LifetimeRegistry::new();
        let outer = reg.begin(None);
        let inner = reg.begin(None);

        let a = reg.register(outer, handle(1)).unwrap();
        let b = reg.register(inner, handle(2)).unwrap();

        assert_eq!(released(reg.end(inner).unwrap()), vec![handle(2)]);
        assert_eq!(reg.get(a), Ok(handle(1).bits()));
        assert_eq!(reg.get(b), Err(LifetimeError::UseAfterEnd { key: b }));

        assert_eq!(released(reg.end(outer).unwrap()), vec![handle(1)]);
    }

    #[test]
    fn borrowed_handle_blocks_end_and_remove() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);
        let key = reg.register(scope, handle(3)).unwrap();

        reg.borrow(key).unwrap();
        reg.borrow(key).unwrap();
        assert_eq!(reg.state(key), HandleState::Borrowed(2));

        assert_eq!(
            reg.end(scope).unwrap_err(),
            LifetimeError::EndWhileBorrowed { scope, borrowed: 1 }
        );
        assert_eq!(
            reg.remove(key).unwrap_err(),
            LifetimeError::HandleBorrowed { key, borrows: 2 }
        );

        reg.unborrow(key).unwrap();
        reg.unborrow(key).unwrap();
        assert_eq!(reg.state(key), HandleState::Registered);
        assert_eq!(released(reg.end(scope).unwrap()).len(), 1);
    }

    #[test]
    fn forced_end_forgets_borrowed_members() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);
        let lent = reg.register(scope, handle(1)).unwrap();
        reg.register(scope, handle(2)).unwrap();
        reg.borrow(lent).unwrap();

        let (released, leaked) = reg.end_forced(scope);
        assert_eq!(released, vec![handle(2)]);
        assert_eq!(leaked, 1);
        assert_eq!(reg.live_count(), 0);
        assert!(!reg.is_open(scope));
    }

    #[test]
    fn labels_are_kept_while_open() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(Some(Cow::Borrowed("frame-data")));

        assert_eq!(reg.label(scope), Some("frame-data"));
        reg.end(scope).unwrap();
        assert_eq!(reg.label(scope), None);
    }

    #[test]
    fn moved_handle_comes_out_once() {
        let mut reg = LifetimeRegistry::new();
        let first = reg.begin(None);
        let second = reg.begin(None);

        let key = reg.register(first, handle(5)).unwrap();
        let moved = reg.remove(key).unwrap();
        reg.register(second, moved).unwrap();

        assert!(released(reg.end(first).unwrap()).is_empty());
        assert_eq!(released(reg.end(second).unwrap()), vec![handle(5)]);
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn keys_do_not_resolve_in_other_registries() {
        let mut ours = LifetimeRegistry::new();
        let mut theirs = LifetimeRegistry::new();

        let our_scope = ours.begin(None);
        let their_scope = theirs.begin(None);
        assert_ne!(our_scope, their_scope);

        // Same slot index and generation in both registries.
        let our_key = ours.register(our_scope, handle(1)).unwrap();
        let their_key = theirs.register(their_scope, handle(2)).unwrap();
        assert_eq!((our_key.index, our_key.generation), (their_key.index, their_key.generation));

        assert_eq!(theirs.get(our_key), Err(LifetimeError::UseAfterEnd { key: our_key }));
        assert!(theirs.remove(our_key).is_err());
        assert_eq!(theirs.get(their_key), Ok(handle(2).bits()));
    }

    #[test]
    fn exhausted_slot_is_retired() {
        let mut reg = LifetimeRegistry::new();
        let scope = reg.begin(None);

        let key = reg.register(scope, handle(1)).unwrap();
        reg.remove(key).unwrap();
        reg.slots[key.index as usize].generation = u32::MAX;

        let last = reg.register(scope, handle(2)).unwrap();
        assert_eq!(last.index, key.index);
        assert_eq!(last.generation, u32::MAX);
        reg.remove(last).unwrap();

        let fresh = reg.register(scope, handle(3)).unwrap();
        assert_ne!(fresh.index, key.index);
        assert_eq!(reg.get(last), Err(LifetimeError::UseAfterRelease { key: last }));
        assert_eq!(reg.get(fresh), Ok(handle(3).bits()));
    }

    #[test]
    fn keys_and_scope_ids_are_not_send() {
        // Resolves only if exactly one impl applies, i.e. if the type is not `Send`.
        trait AmbiguousIfSend<A> {
            fn check() {}
        }
        impl<T: ?Sized> AmbiguousIfSend<()> for T {}
        impl<T: ?Sized + Send> AmbiguousIfSend<u8> for T {}

        <HandleKey as AmbiguousIfSend<_>>::check();
        <ScopeId as AmbiguousIfSend<_>>::check();
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Property tests

#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Debug)]
    enum Operation {
        Begin,
        End(usize),
        Register(usize),
        /// Moves a registered handle into another scope.
        Reregister(usize, usize),
        Remove(usize),
        Borrow(usize),
        Unborrow(usize),
    }

    prop_compose! {
        fn arbitrary_op()(variant in 0..7usize, pick in any::<usize>(), target in any::<usize>()) -> Operation {
            match variant {
                0 => Operation::Begin,
                1 => Operation::End(pick),
                2 | 3 => Operation::Register(pick),
                4 => Operation::Remove(pick),
                5 => Operation::Reregister(pick, target),
                _ => if pick % 2 == 0 { Operation::Borrow(pick) } else { Operation::Unborrow(pick) },
            }
        }
    }

    prop_compose! {
        fn arbitrary_ops(max: usize)(ops in prop::collection::vec(arbitrary_op(), 0..max)) -> Vec<Operation> {
            ops
        }
    }

    /// Runs operations against the registry and checks that every registered handle comes out exactly once.
    fn run(ops: Vec<Operation>) {
        let mut reg = LifetimeRegistry::new();
        let mut scopes: Vec<ScopeId> = Vec::new();
        let mut keys: Vec<HandleKey> = Vec::new();
        let mut borrows: HashMap<HandleKey, u32> = HashMap::new();

        let mut registered = 0u64;
        let mut out: Vec<ErasedHandle> = Vec::new();

        for op in ops {
            match op {
                Operation::Begin => scopes.push(reg.begin(None)),
                Operation::End(pick) if !scopes.is_empty() => {
                    let scope = scopes[pick % scopes.len()];
                    match reg.end(scope) {
                        Ok(EndOutcome::Ended(handles)) => out.extend(handles),
                        Ok(EndOutcome::AlreadyEnded) => {}
                        Err(LifetimeError::EndWhileBorrowed { .. }) => {
                            assert!(borrows.iter().any(|(k, &n)| n > 0 && k.scope_id() == scope));
                        }
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                Operation::Register(pick) if !scopes.is_empty() => {
                    let scope = scopes[pick % scopes.len()];
                    // SAFETY: test values never reach the engine.
                    let h = unsafe { ErasedHandle::new(HandleKind::Array, [registered, 0, 0]) };

                    match reg.register(scope, h) {
                        Ok(key) => {
                            registered += 1;
                            keys.push(key);
                        }
                        Err((e, _)) => assert!(!reg.is_open(scope), "{e}"),
                    }
                }
                Operation::Reregister(pick, target) if !keys.is_empty() && !scopes.is_empty() => {
                    let key = keys[pick % keys.len()];
                    let scope = scopes[target % scopes.len()];

                    if let Ok(h) = reg.remove(key) {
                        match reg.register(scope, h) {
                            Ok(new_key) => keys.push(new_key),
                            Err((_, h)) => out.push(h),
                        }
                    }
                }
                Operation::Remove(pick) if !keys.is_empty() => {
                    let key = keys[pick % keys.len()];
                    if let Ok(h) = reg.remove(key) {
                        out.push(h);
                    }
                }
                Operation::Borrow(pick) if !keys.is_empty() => {
                    let key = keys[pick % keys.len()];
                    if reg.borrow(key).is_ok() {
                        *borrows.entry(key).or_default() += 1;
                    }
                }
                Operation::Unborrow(pick) if !keys.is_empty() => {
                    let key = keys[pick % keys.len()];
                    let count = borrows.entry(key).or_default();
                    if *count > 0 && reg.unborrow(key).is_ok() {
                        *count -= 1;
                    }
                }
                _ => {}
            }

            // Everything registered is either still live or has come out.
            assert_eq!(reg.live_count() + out.len(), registered as usize);
        }

        for (key, count) in borrows {
            for _ in 0..count {
                let _ = reg.unborrow(key);
            }
        }

        for scope in scopes {
            if let Ok(EndOutcome::Ended(handles)) = reg.end(scope) {
                out.extend(handles);
            }
        }

        assert_eq!(reg.live_count(), 0);
        assert_eq!(out.len() as u64, registered);

        let mut ids: Vec<u64> = out.iter().map(|h| h.words()[0]).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len() as u64, registered, "a handle came out twice");
    }

    proptest! {
        #[test]
        fn every_handle_released_exactly_once(ops in arbitrary_ops(64)) {
            run(ops)
        }

        #[test]
        fn dead_keys_never_resolve(ops in arbitrary_ops(32)) {
            let mut reg = LifetimeRegistry::new();
            let scope = reg.begin(None);
            let mut dead = Vec::new();

            for (i, op) in ops.into_iter().enumerate() {
                // SAFETY: test values never reach the engine.
                let h = unsafe { ErasedHandle::new(HandleKind::String, [i as u64, 0, 0]) };
                let key = reg.register(scope, h).unwrap();
                if matches!(op, Operation::Remove(_) | Operation::End(_)) {
                    reg.remove(key).unwrap();
                    dead.push(key);
                }
            }

            for key in dead {
                prop_assert_eq!(reg.get(key), Err(LifetimeError::UseAfterRelease { key }));
            }
        }
    }
}
