/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Integration tests: an extension library loaded against an in-process mock engine.

use gdbind::init::{ExtensionLibrary, InitLevel};
use gdbind::lifetime::LeakPolicy;
use gdbind::registry::ClassRegistrar;

pub mod classes;
pub mod framework;

pub struct IntegrationTests;

unsafe impl ExtensionLibrary for IntegrationTests {
    fn extension_api_json() -> &'static str {
        framework::mock::TEST_API_JSON
    }

    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn register_classes(level: InitLevel, registrar: &mut ClassRegistrar) {
        use gdbind::classes::{Object, RefCounted};

        match level {
            InitLevel::Core => {
                registrar.register::<Object>();
                registrar.register::<RefCounted>();
                registrar.register::<classes::Resource>();
            }
            InitLevel::Scene => {
                registrar.register::<classes::Node>();
                registrar.register::<classes::Label>();
                registrar.register::<classes::Json>();

                match classes::Player::class_record() {
                    Ok(record) => registrar.register_record(record),
                    Err(e) => gdbind::godot_error!("cannot register Player: {e}"),
                }
            }
            _ => {}
        }
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::WarnAndRelease
    }
}

gdbind::entry_point!(IntegrationTests => itest_init);
