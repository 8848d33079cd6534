/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global variable that is written during startup and only read afterwards.
///
/// Features:
/// - A `const` constructor, allowing to be used in `static` variables without `Option`.
/// - Initialization function provided in constructor, not in each use site separately.
/// - Mutable access through [`lock()`](Self::lock) while the global is open; shared access through [`read()`](Self::read) at any time.
/// - An explicit [`freeze()`](Self::freeze) that ends the write phase. Any later `lock()` panics instead of silently mutating
///   state that other threads already rely on.
pub struct Global<T> {
    value: RwLock<InitState<T>>,
    frozen: AtomicBool,
}

impl<T> Global<T> {
    /// Create `Global<T>`, providing a lazy initialization function.
    ///
    /// The initialization function is only called once, when the global is first accessed.
    pub const fn new(init_fn: fn() -> T) -> Self {
        Self {
            value: RwLock::new(InitState::Pending(init_fn)),
            frozen: AtomicBool::new(false),
        }
    }

    /// Create `Global<T>` with `T::default()` as initialization function.
    ///
    /// This is inherent rather than implementing the `Default` trait, because the latter is not `const` and thus useless in static contexts.
    pub const fn default() -> Self
    where
        T: Default,
    {
        Self::new(T::default)
    }

    /// Returns a guard that gives mutable access to the value.
    ///
    /// # Panics
    /// - If the global has been frozen.
    /// - If the initialization function panics. Once that happens, the global is considered poisoned and all future accesses panic.
    #[track_caller]
    pub fn lock(&self) -> GlobalGuard<'_, T> {
        assert!(
            !self.is_frozen(),
            "global state is frozen; it can only be modified during startup"
        );

        let guard = self.ensure_init();
        debug_assert!(matches!(*guard, InitState::Initialized(_)));

        GlobalGuard { guard }
    }

    /// Returns a guard that gives shared access to the value. Multiple readers may hold one concurrently.
    pub fn read(&self) -> GlobalReadGuard<'_, T> {
        {
            let guard = self.value.read().expect("lock poisoned");
            if matches!(*guard, InitState::Initialized(_)) {
                return GlobalReadGuard { guard };
            }
        }

        // Initialize under the write lock, then downgrade by re-acquiring.
        drop(self.ensure_init());

        let guard = self.value.read().expect("lock poisoned");
        GlobalReadGuard { guard }
    }

    /// Ends the write phase. Idempotent.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Re-opens the write phase, for the next startup stage or re-initialization.
    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    fn ensure_init(&self) -> RwLockWriteGuard<'_, InitState<T>> {
        let mut guard = self.value.write().expect("lock poisoned");
        let pending_state = match &mut *guard {
            InitState::Initialized(_) => {
                return guard;
            }
            InitState::TransientInitializing => {
                // SAFETY: only set inside this function and all paths (panic + return) leave the enum in a different state.
                unsafe { std::hint::unreachable_unchecked() };
            }
            InitState::Failed => {
                panic!("previous Global<T> initialization failed due to panic")
            }
            state @ InitState::Pending(_) => {
                std::mem::replace(state, InitState::TransientInitializing)
            }
        };

        let InitState::Pending(init_fn) = pending_state else {
            // SAFETY: all other paths leave the function, see above.
            unsafe { std::hint::unreachable_unchecked() }
        };

        // Unwinding should be safe here, as there is no unsafe code relying on it.
        let init_fn = std::panic::AssertUnwindSafe(init_fn);
        match std::panic::catch_unwind(init_fn) {
            Ok(value) => *guard = InitState::Initialized(value),
            Err(e) => {
                eprintln!("panic during Global<T> initialization");
                *guard = InitState::Failed;
                std::panic::resume_unwind(e);
            }
        };

        guard
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Guards

/// Guard that temporarily gives mutable access to a `Global<T>`'s inner value.
pub struct GlobalGuard<'a, T> {
    guard: RwLockWriteGuard<'a, InitState<T>>,
}

impl<T> Deref for GlobalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard.unwrap_ref()
    }
}

impl<T> DerefMut for GlobalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard.unwrap_mut()
    }
}

/// Guard that temporarily gives shared access to a `Global<T>`'s inner value.
pub struct GlobalReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, InitState<T>>,
}

impl<T> Deref for GlobalReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard.unwrap_ref()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Internals

enum InitState<T> {
    Initialized(T),
    Pending(fn() -> T),
    TransientInitializing,
    Failed,
}

impl<T> InitState<T> {
    fn unwrap_ref(&self) -> &T {
        match self {
            InitState::Initialized(t) => t,
            _ => {
                // SAFETY: This method is only called from a guard, which can only be obtained in Initialized state.
                unsafe { std::hint::unreachable_unchecked() }
            }
        }
    }

    fn unwrap_mut(&mut self) -> &mut T {
        match self {
            InitState::Initialized(t) => t,
            _ => {
                // SAFETY: This method is only called from a guard, which can only be obtained in Initialized state.
                unsafe { std::hint::unreachable_unchecked() }
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    static MAP: Global<HashMap<i32, &'static str>> = Global::default();
    static VEC: Global<Vec<i32>> = Global::new(|| vec![1, 2, 3]);
    static FROZEN: Global<Vec<i32>> = Global::default();

    #[test]
    fn test_global_map() {
        {
            let mut map = MAP.lock();
            map.insert(2, "two");
            map.insert(3, "three");
        }

        {
            let mut map = MAP.lock();
            map.insert(1, "one");
        }

        let map = MAP.read();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&3), Some(&"three"));
    }

    #[test]
    fn test_global_vec() {
        {
            let mut vec = VEC.lock();
            vec.push(4);
        }

        let vec = VEC.read();
        assert_eq!(*vec, &[1, 2, 3, 4]);
    }

    #[test]
    fn test_frozen_rejects_writes() {
        FROZEN.lock().push(1);
        FROZEN.freeze();

        assert_eq!(*FROZEN.read(), &[1]);

        let result = std::panic::catch_unwind(|| {
            FROZEN.lock().push(2);
        });
        assert!(result.is_err());

        FROZEN.unfreeze();
        FROZEN.lock().push(3);
        assert_eq!(*FROZEN.read(), &[1, 3]);
    }
}
