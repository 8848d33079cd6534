/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Method-bind dispatch table.
//!
//! Binds are resolved eagerly, one table per init level, from the class database. Call sites then hold a
//! [`CachedMethodBind`] in a `static`, which looks up the table only on first use; afterwards a call costs one atomic load.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate as sys;
use sys::{ClassDb, InitLevel, StringCache};

/// Opaque pointer identifying one engine method, as returned by `classdb_get_method_bind`.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct ClassMethodBind(pub sys::GDExtensionMethodBindPtr);

// SAFETY: the pointer is an immutable engine-side identifier; it is never dereferenced on the Rust side, only passed back to the engine.
unsafe impl Sync for ClassMethodBind {}
// SAFETY: see `Sync` impl.
unsafe impl Send for ClassMethodBind {}

impl fmt::Debug for ClassMethodBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassMethodBind({:p})", self.0)
    }
}

/// All method binds of the classes belonging to one init level.
pub struct ClassMethodTable {
    level: InitLevel,
    binds: HashMap<String, HashMap<String, ClassMethodBind>>,
    method_count: usize,
}

impl ClassMethodTable {
    /// Resolves every bindable method of every class at `level`.
    ///
    /// # Panics
    /// If the engine cannot resolve one of the methods, which indicates that the class database and the engine disagree.
    pub fn load(
        level: InitLevel,
        class_db: &ClassDb,
        interface: &sys::EngineInterface,
        string_names: &mut StringCache,
    ) -> Self {
        // SAFETY: presence verified during initialize().
        let get_method_bind = unsafe { interface.classdb_get_method_bind.unwrap_unchecked() };

        let mut binds = HashMap::new();
        let mut method_count = 0;

        for class in class_db.classes_at_level(level) {
            let mut class_binds = HashMap::with_capacity(class.bindable_methods.len());

            for method in &class.bindable_methods {
                let bind = sys::toolbox::load_class_method(
                    get_method_bind,
                    string_names,
                    &class.name,
                    &method.name,
                    method.hash,
                );

                class_binds.insert(method.name.clone(), bind);
                method_count += 1;
            }

            binds.insert(class.name.clone(), class_binds);
        }

        sys::out!("Loaded {method_count} method binds for level {level:?}.");

        Self {
            level,
            binds,
            method_count,
        }
    }

    pub fn level(&self) -> InitLevel {
        self.level
    }

    pub fn get(&self, class_name: &str, method_name: &str) -> Option<ClassMethodBind> {
        self.binds.get(class_name)?.get(method_name).copied()
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.binds.contains_key(class_name)
    }

    pub fn method_count(&self) -> usize {
        self.method_count
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Method bind resolved once and cached at the call site.
///
/// ```ignore
/// static SET_TEXT: CachedMethodBind = CachedMethodBind::new("Label", "set_text");
/// let bind = SET_TEXT.get();
/// ```
pub struct CachedMethodBind {
    class_name: &'static str,
    method_name: &'static str,
    bind: OnceLock<ClassMethodBind>,
}

impl CachedMethodBind {
    pub const fn new(class_name: &'static str, method_name: &'static str) -> Self {
        Self {
            class_name,
            method_name,
            bind: OnceLock::new(),
        }
    }

    /// Returns the bind, resolving it from the method tables on first use.
    ///
    /// # Panics
    /// If the method is not part of any loaded method table. This is fatal: either the class's init level is not loaded yet, or
    /// the class database does not know the method.
    #[track_caller]
    pub fn get(&self) -> ClassMethodBind {
        *self.bind.get_or_init(|| {
            self.try_resolve().unwrap_or_else(|| {
                panic!(
                    "method bind {}::{} is not available; its class is unknown or its init level is not loaded yet.{}",
                    self.class_name,
                    self.method_name,
                    sys::toolbox::INFO
                )
            })
        })
    }

    /// Whether the bind has already been resolved.
    pub fn is_resolved(&self) -> bool {
        self.bind.get().is_some()
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn method_name(&self) -> &'static str {
        self.method_name
    }

    fn try_resolve(&self) -> Option<ClassMethodBind> {
        if !sys::is_initialized() {
            return None;
        }

        sys::find_method_bind(self.class_name, self.method_name)
    }
}

impl fmt::Debug for CachedMethodBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CachedMethodBind({}::{}, resolved: {})",
            self.class_name,
            self.method_name,
            self.is_resolved()
        )
    }
}
