/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicBool, Ordering::Relaxed};

use gdbind_ffi as sys;
use sys::out;

use crate::lifetime::LeakPolicy;
use crate::registry::{class, ClassRegistrar};

pub use sys::BindingConfig;

#[doc(hidden)]
pub unsafe fn __gdbind_load_library<E: ExtensionLibrary>(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
    library: sys::GDExtensionClassLibraryPtr,
    init: *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool {
    let init_code = || {
        let class_db = match sys::ClassDb::from_json(E::extension_api_json()) {
            Ok(db) => db,
            Err(e) => {
                crate::godot_error!("cannot load extension library: {e}");
                return 0;
            }
        };

        let config = BindingConfig {
            validate_object_ids: E::validate_object_ids(),
        };

        // SAFETY: called once, by the engine's entry point call.
        unsafe { sys::initialize(get_proc_address, library, class_db, config) };

        let init_params = sys::GDExtensionInitialization {
            minimum_initialization_level: E::min_level().to_sys(),
            userdata: std::ptr::null_mut(),
            initialize: Some(ffi_initialize_layer::<E>),
            deinitialize: Some(ffi_deinitialize_layer::<E>),
        };

        // SAFETY: the engine passes a valid output parameter.
        unsafe { *init = init_params };

        1
    };

    let ctx = || "error when loading extension library";
    crate::private::handle_panic(ctx, init_code).unwrap_or(0)
}

static LEVEL_CORE_LOADED: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn ffi_initialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to initialize extension level `{level:?}`");

    // Swallow panics; they have been printed already.
    let _ = crate::private::handle_panic(ctx, || {
        // SAFETY: the engine calls this on the main thread, after the entry point initialized the binding.
        unsafe { on_level_init(level) };

        let mut registrar = ClassRegistrar::new(level);
        E::register_classes(level, &mut registrar);
        E::on_level_init(level);
    });

    // Frozen even if registration panicked.
    class::freeze();
}

unsafe extern "C" fn ffi_deinitialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to deinitialize extension level `{level:?}`");

    let _ = crate::private::handle_panic(ctx, || {
        E::on_level_deinit(level);
        on_level_deinit(level, E::leak_policy());
    });
}

/// Loads the method tables up to `level` and opens the class registry for registration.
///
/// Levels below [`ExtensionLibrary::min_level()`] are never announced by the engine, but their classes (`Object` at least) are
/// needed by every higher level. They are loaded together with the first announced level.
///
/// # Safety
/// - Must be called from the main thread.
/// - The binding must be initialized.
#[deny(unsafe_op_in_unsafe_fn)]
unsafe fn on_level_init(level: InitLevel) {
    if !LEVEL_CORE_LOADED.swap(true, Relaxed) {
        for lower in InitLevel::ALL.into_iter().filter(|&l| l < level && l != InitLevel::Editor) {
            // SAFETY: main thread, binding initialized; loading an already loaded level is a no-op.
            unsafe { sys::load_class_method_table(lower) };
        }
    }

    // SAFETY: see above.
    unsafe { sys::load_class_method_table(level) };

    class::unfreeze();
}

/// Drops the classes of `level`. At `Core`, also ends the root scope and releases global caches.
fn on_level_deinit(level: InitLevel, leak_policy: LeakPolicy) {
    class::unfreeze();
    let removed = class::unregister_level(level);
    class::freeze();

    out!("deinit level {level:?}: unregistered {removed} classes");

    if level == InitLevel::Core {
        let remaining = crate::lifetime::end_root(leak_policy);
        out!("root scope ended with {remaining} handles");

        // SAFETY: last use of class names; the binding is still initialized.
        unsafe { crate::meta::class_id_cleanup() };

        LEVEL_CORE_LOADED.store(false, Relaxed);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Defines the entry point of an extension library.
///
/// Every library has exactly one implementation of this trait, turned into the exported entry symbol by [`entry_point!`].
///
/// ```ignore
/// use gdbind_core::init::ExtensionLibrary;
///
/// struct MyExtension;
///
/// unsafe impl ExtensionLibrary for MyExtension {
///     fn extension_api_json() -> &'static str {
///         include_str!("../extension_api.json")
///     }
/// }
///
/// gdbind_core::entry_point!(MyExtension => my_extension_init);
/// ```
///
/// # Safety
/// The library cannot enforce any guarantees outside Rust code. Engine-side code (scripts, other extensions) must not free objects
/// that Rust owns.
pub unsafe trait ExtensionLibrary {
    /// Class database in `extension_api.json` format, matching the engine the library is loaded into.
    fn extension_api_json() -> &'static str;

    /// Determines the initialization level at which the extension is loaded (`Scene` by default).
    fn min_level() -> InitLevel {
        InitLevel::Scene
    }

    /// Registers the classes that become available at `level`.
    ///
    /// Called before [`on_level_init()`][Self::on_level_init]. The class registry is frozen once the callback returns.
    #[allow(unused_variables)]
    fn register_classes(level: InitLevel, registrar: &mut ClassRegistrar) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level is loaded.
    ///
    /// This will only be invoked for levels >= [`Self::min_level()`], in ascending order.
    #[allow(unused_variables)]
    fn on_level_init(level: InitLevel) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level is unloaded.
    ///
    /// This will only be invoked for levels >= [`Self::min_level()`], in descending order.
    #[allow(unused_variables)]
    fn on_level_deinit(level: InitLevel) {
        // Nothing by default.
    }

    /// What happens to handles still registered in the root scope when the `Core` level is unloaded.
    fn leak_policy() -> LeakPolicy {
        LeakPolicy::WarnAndRelease
    }

    /// Whether every call on an object first checks that the engine still maps its instance ID to the same object.
    ///
    /// Builds with strict safeguards always check.
    fn validate_object_ids() -> bool {
        true
    }
}

/// Stage of the engine initialization process.
///
/// See also:
/// - [`ExtensionLibrary::on_level_init()`]
/// - [`ExtensionLibrary::on_level_deinit()`]
pub type InitLevel = sys::InitLevel;

/// Exports the entry symbol for an [`ExtensionLibrary`] implementation.
///
/// The symbol name must match `entry_symbol` in the library's `.gdextension` file.
#[macro_export]
macro_rules! entry_point {
    ($Library:ty => $symbol:ident) => {
        #[no_mangle]
        unsafe extern "C" fn $symbol(
            get_proc_address: $crate::sys::GDExtensionInterfaceGetProcAddress,
            library: $crate::sys::GDExtensionClassLibraryPtr,
            init: *mut $crate::sys::GDExtensionInitialization,
        ) -> $crate::sys::GDExtensionBool {
            $crate::init::__gdbind_load_library::<$Library>(get_proc_address, library, init)
        }
    };
}
