/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::panic;
use std::sync::{Once, OnceLock};

use gdbind::sys;

pub mod mock;

type LevelCallback = unsafe extern "C" fn(*mut std::ffi::c_void, sys::GDExtensionInitializationLevel);

static INIT: Once = Once::new();
static DEINITIALIZE: OnceLock<LevelCallback> = OnceLock::new();

/// Loads the library against the mock engine, the way the engine loads a `.gdextension`: entry point, then one callback per
/// init level from `Core` to `Scene`. Runs once per test binary; every test calls it first.
pub fn init() {
    INIT.call_once(|| {
        let mut init = sys::GDExtensionInitialization {
            minimum_initialization_level: 0,
            userdata: std::ptr::null_mut(),
            initialize: None,
            deinitialize: None,
        };

        // SAFETY: the mock provides every interface function; the output parameter is valid.
        let success = unsafe { crate::itest_init(Some(mock::get_proc_address), std::ptr::null_mut(), &mut init) };
        assert_eq!(success, 1, "entry point failed");

        let initialize = init.initialize.expect("entry point provides initialize callback");
        let deinitialize = init.deinitialize.expect("entry point provides deinitialize callback");

        for level in init.minimum_initialization_level..=sys::GDEXTENSION_INITIALIZATION_SCENE {
            // SAFETY: levels are announced in ascending order, after the entry point.
            unsafe { initialize(init.userdata, level) };
        }

        let _ = DEINITIALIZE.set(deinitialize);
    });
}

/// Unloads all levels in descending order, like the engine does on exit.
///
/// Only for a test binary with a single test: everything is unusable afterwards.
pub fn shutdown() {
    let deinitialize = DEINITIALIZE.get().expect("init() must run before shutdown()");

    for level in (sys::GDEXTENSION_INITIALIZATION_CORE..=sys::GDEXTENSION_INITIALIZATION_SCENE).rev() {
        // SAFETY: levels are unloaded in descending order, after they were all loaded.
        unsafe { deinitialize(std::ptr::null_mut(), level) };
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic helpers

/// Runs `callback` without the panic hook and without error output of the library, for tests that expect failures.
pub fn suppress_panic_log<R>(callback: impl FnOnce() -> R) -> R {
    // DISABLE following lines to *temporarily* debug panics.
    let prev_hook = panic::take_hook();
    panic::set_hook(Box::new(
        |_panic_info| { /* suppress panic hook; do nothing */ },
    ));

    // Keep following lines.
    let prev_print_level = gdbind::private::set_error_print_level(0);
    let res = callback();
    gdbind::private::set_error_print_level(prev_print_level);

    // DISABLE following line to *temporarily* debug panics.
    panic::set_hook(prev_hook);

    res
}

pub fn expect_panic(context: &str, code: impl FnOnce()) {
    // Generally, types should be unwind safe, and this helps ergonomics in testing (especially around &mut in expect_panic closures).
    let code = panic::AssertUnwindSafe(code);
    let panic = suppress_panic_log(move || panic::catch_unwind(code));

    assert!(
        panic.is_err(),
        "code should have panicked but did not: {context}",
    );
}

/// Instance ID of an object known to be alive, as the mock engine reports it.
pub fn instance_id_of<T: gdbind::obj::RawAccess>(object: &T) -> u64 {
    object.instance_id().to_u64()
}
