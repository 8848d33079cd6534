/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Thread safe binding storage.
//!
//! Everything in here is written during startup (interface and class database once, then one method table per init level) and
//! only read afterwards, from any thread.

use std::sync::OnceLock;

use crate as sys;
use sys::{BuiltinLifecycleTable, ClassDb, ClassMethodBind, ClassMethodTable, EngineInterface, GodotVersion, InitLevel};

pub(crate) struct EngineBinding {
    interface: EngineInterface,
    library: ClassLibraryPtr,
    builtin_lifecycle: BuiltinLifecycleTable,
    class_db: ClassDb,
    method_tables: [OnceLock<ClassMethodTable>; 4],
    version: Option<GodotVersion>,
    config: BindingConfig,
}

static BINDING: OnceLock<EngineBinding> = OnceLock::new();

/// Runtime configuration, provided by the extension library at load time.
#[derive(Clone, Debug)]
pub struct BindingConfig {
    /// Before each call on an engine-owned object, check that its instance ID still maps to the same object.
    pub validate_object_ids: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            validate_object_ids: true,
        }
    }
}

/// Newtype around `GDExtensionClassLibraryPtr` so we can implement `Sync` and `Send` manually for this.
struct ClassLibraryPtr(sys::GDExtensionClassLibraryPtr);

// SAFETY: This implementation of `Sync` and `Send` does not guarantee that reading from or writing to the pointer is actually
// thread safe. It merely means we can send/share the pointer itself between threads. Which is safe since any place that actually
// reads/writes to this pointer must ensure they do so in a thread safe manner.
unsafe impl Sync for ClassLibraryPtr {}
// SAFETY: See `Sync` impl safety doc.
unsafe impl Send for ClassLibraryPtr {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Startup

/// Loads the engine interface and stores the binding.
///
/// # Safety
/// - `get_proc_address` must be the function handed to the extension entry point.
/// - Must be called once, before any other function of this crate that talks to the engine.
///
/// # Panics
/// - If the binding was already initialized.
/// - If the engine does not provide one of the interface functions.
pub unsafe fn initialize(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
    library: sys::GDExtensionClassLibraryPtr,
    class_db: ClassDb,
    config: BindingConfig,
) {
    let get_proc_address = get_proc_address.expect("get_proc_address unexpectedly null");

    let interface = EngineInterface::load(get_proc_address);

    let missing = interface.missing_functions();
    assert!(
        missing.is_empty(),
        "engine does not provide required interface functions: {}{}",
        missing.join(", "),
        sys::toolbox::INFO
    );

    let version = sys::read_godot_version(&interface);
    let builtin_lifecycle = BuiltinLifecycleTable::load(&interface);

    let api_header = class_db.header();
    match &version {
        Some(version) => {
            sys::out!(
                "Initialize binding: engine {version}, class database {}",
                api_header.version_full_name
            );

            if (version.major, version.minor) != (api_header.version_major as u32, api_header.version_minor as u32) {
                eprintln!(
                    "WARNING: class database was generated for {}, but the engine is {version}; method hashes may not resolve",
                    api_header.version_full_name
                );
            }
        }
        None => sys::out!("Initialize binding: engine version unknown"),
    }

    let binding = EngineBinding {
        interface,
        library: ClassLibraryPtr(library),
        builtin_lifecycle,
        class_db,
        method_tables: Default::default(),
        version,
        config,
    };

    assert!(
        BINDING.set(binding).is_ok(),
        "binding must only be initialized once"
    );
}

/// Resolves all method binds of the classes at `level` and stores them.
///
/// Loading a level twice is a no-op, so a re-entered init level keeps the binds resolved the first time.
///
/// # Safety
/// The binding must have been initialized.
pub unsafe fn load_class_method_table(level: InitLevel) {
    let binding = get_binding();
    let cell = &binding.method_tables[level.index()];

    if cell.get().is_some() {
        sys::out!("Method table for level {level:?} already loaded.");
        return;
    }

    let mut string_names = sys::StringCache::new(&binding.interface, &binding.builtin_lifecycle);
    let table = ClassMethodTable::load(level, &binding.class_db, &binding.interface, &mut string_names);

    sys::out!(
        "Method table for level {level:?}: {} binds, {} string names",
        table.method_count(),
        string_names.len()
    );

    // A concurrent load of the same level would produce an identical table; keeping the first is fine.
    let _ = cell.set(table);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Public API

#[inline]
pub fn is_initialized() -> bool {
    BINDING.get().is_some()
}

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline(always)]
pub unsafe fn get_interface() -> &'static EngineInterface {
    &get_binding().interface
}

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline(always)]
pub unsafe fn get_library() -> sys::GDExtensionClassLibraryPtr {
    get_binding().library.0
}

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline(always)]
pub unsafe fn builtin_lifecycle_api() -> &'static BuiltinLifecycleTable {
    &get_binding().builtin_lifecycle
}

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline]
pub unsafe fn class_db() -> &'static ClassDb {
    &get_binding().class_db
}

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline]
pub unsafe fn config() -> &'static BindingConfig {
    &get_binding().config
}

/// Engine version, if the binding is initialized and the engine reported one.
pub fn godot_version() -> Option<&'static GodotVersion> {
    BINDING.get()?.version.as_ref()
}

/// Method table of an init level.
///
/// # Safety
/// The binding must have been initialized before calling this function.
///
/// # Panics (debug)
/// If the level has not been loaded yet.
#[inline]
pub unsafe fn class_method_table(level: InitLevel) -> &'static ClassMethodTable {
    let cell = &get_binding().method_tables[level.index()];

    debug_assert!(
        cell.get().is_some(),
        "cannot fetch classes; init level '{level:?}' not yet loaded"
    );

    cell.get().unwrap_unchecked()
}

/// Whether the method table of `level` has been loaded.
pub fn is_level_loaded(level: InitLevel) -> bool {
    BINDING
        .get()
        .is_some_and(|b| b.method_tables[level.index()].get().is_some())
}

/// Looks up a method bind in the table of the level that its class belongs to.
///
/// Returns `None` if the binding is not initialized, the class is unknown, its level is not loaded, or the method is absent.
pub fn find_method_bind(class_name: &str, method_name: &str) -> Option<ClassMethodBind> {
    let binding = BINDING.get()?;
    let class = binding.class_db.class(class_name)?;
    let table = binding.method_tables[class.init_level.index()].get()?;

    table.get(class_name, method_name)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Crate-local implementation

/// # Safety
/// The binding must have been initialized before calling this function.
#[inline(always)]
pub(crate) unsafe fn get_binding() -> &'static EngineBinding {
    let binding = BINDING.get();

    debug_assert!(
        binding.is_some(),
        "engine not available; make sure you are not calling it from unit/doc tests"
    );

    // SAFETY: the binding has been initialized before calling this function.
    binding.unwrap_unchecked()
}
