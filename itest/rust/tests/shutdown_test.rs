/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Unloading the library. Separate test binary with a single test, since nothing works after shutdown.

use gdbind::lifetime::live_handles;
use gdbind::prelude::*;
use gdbind::registry::class::{is_frozen, registered_count};
use gdbind::sys::VariantType;

use itest::classes::Label;
use itest::framework::mock::{self, FreeEvent, FreeTracker, MessageLevel};
use itest::framework::{self, instance_id_of};

#[test]
fn shutdown_releases_root_scope_and_unregisters_classes() {
    framework::init();
    assert!(registered_count() > 0);

    // Created without any explicit scope, so they land in the root scope.
    let text = GString::from("left behind");
    let label = Gd::<Label>::new();
    let text_id = text.handle().words()[0];
    let label_id = instance_id_of(&label);

    let scoped = Scope::begin();
    let _inner = GString::from_str_in(scoped, "ended before shutdown");
    scoped.end();

    mock::take_messages();
    let tracker = FreeTracker::start();

    framework::shutdown();

    // Cached class names are destroyed as well; only count what the root scope held.
    let strings_freed = tracker
        .events()
        .iter()
        .filter(|&e| *e == FreeEvent::Builtin(VariantType::String))
        .count();
    assert_eq!(strings_freed, 1);
    assert_eq!(tracker.objects_freed("Label"), 1);
    assert_eq!(tracker.bad_frees(), 0);
    assert!(!mock::is_value_alive(text_id));
    assert!(!mock::is_object_alive(label_id));
    assert_eq!(live_handles(), 0);

    let messages = mock::take_messages();
    assert!(
        messages.iter().any(|m| m.level == MessageLevel::Warning
            && m.text.contains("2 engine handle(s) still registered in the root scope")),
        "{messages:?}"
    );

    assert_eq!(registered_count(), 0);
    assert!(is_frozen());
}
