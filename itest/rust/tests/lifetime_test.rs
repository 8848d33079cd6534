/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::lifetime::{live_handles, open_scopes, EndOutcome, HandleState};
use gdbind::meta::error::LifetimeError;
use gdbind::prelude::*;
use gdbind::sys::VariantType;

use itest::classes::{Label, Resource};
use itest::framework::mock::{self, FreeEvent, FreeTracker};
use itest::framework::{self, expect_panic, instance_id_of};

fn value_id<T: Managed>(value: &T) -> u64 {
    value.handle().words()[0]
}

#[test]
fn end_releases_every_member_once() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "hello");
    let label = Gd::<Label>::new_in(scope);

    let text_id = value_id(&text);
    let label_id = instance_id_of(&label);
    assert_eq!(scope.len(), 2);
    assert_eq!(mock::text_of(text_id).as_deref(), Some("hello"));

    assert!(matches!(scope.end(), EndOutcome::Ended(2)));
    assert!(!scope.is_open());
    assert!(scope.is_empty());

    assert_eq!(tracker.count(), 2);
    assert_eq!(tracker.objects_freed("Label"), 1);
    assert!(tracker.events().contains(&FreeEvent::Builtin(VariantType::String)));
    assert_eq!(tracker.bad_frees(), 0);

    assert!(!mock::is_value_alive(text_id));
    assert!(!mock::is_object_alive(label_id));
}

#[test]
fn access_after_end_fails_fast() {
    framework::init();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "gone");
    scope.end();

    assert_eq!(text.state(), HandleState::Released);
    assert!(!text.is_alive());
    assert!(matches!(text.try_handle(), Err(LifetimeError::UseAfterEnd { .. })));

    expect_panic("handle of ended scope", || {
        text.handle();
    });
    expect_panic("display of ended scope", || {
        let _ = text.to_string();
    });
}

#[test]
fn second_end_is_noop() {
    framework::init();

    let scope = Scope::begin();
    let _text = GString::from_str_in(scope, "once");
    assert!(matches!(scope.end(), EndOutcome::Ended(1)));

    let tracker = FreeTracker::start();
    assert!(matches!(scope.end(), EndOutcome::AlreadyEnded));
    assert!(matches!(scope.try_end(), Ok(EndOutcome::AlreadyEnded)));

    assert_eq!(tracker.count(), 0);
    assert_eq!(tracker.bad_frees(), 0);
}

#[test]
fn early_release_is_not_repeated_at_end() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let first = GString::from_str_in(scope, "first");
    let second = GString::from_str_in(scope, "second");
    let first_key = first.key();

    first.release();
    assert_eq!(tracker.count(), 1);
    assert_eq!(gdbind::lifetime::handle_state(first_key), HandleState::Released);
    assert!(matches!(
        gdbind::lifetime::try_release(first_key),
        Err(LifetimeError::UseAfterRelease { .. })
    ));

    assert_eq!(scope.len(), 1);
    assert!(matches!(scope.end(), EndOutcome::Ended(1)));
    assert!(!second.is_alive());

    assert_eq!(tracker.count(), 2);
    assert_eq!(tracker.bad_frees(), 0);
}

#[test]
fn register_into_ended_scope_releases_value() {
    framework::init();

    let scope = Scope::begin();
    scope.end();

    let tracker = FreeTracker::start();
    expect_panic("register into ended scope", || {
        GString::from_str_in(scope, "late");
    });

    // Created by the engine, then released instead of leaking.
    assert_eq!(tracker.events(), [FreeEvent::Builtin(VariantType::String)]);
}

#[test]
fn with_scope_ends_on_return_and_on_panic() {
    framework::init();
    let before = live_handles();

    let text_id = with_scope(|scope| {
        let text = GString::from_str_in(scope, "inside");
        assert_eq!(Scope::ambient(), scope);
        assert_eq!(live_handles(), before + 1);
        value_id(&text)
    });

    assert!(!mock::is_value_alive(text_id));
    assert_eq!(live_handles(), before);

    let tracker = FreeTracker::start();
    expect_panic("panic inside with_scope", || {
        with_scope(|_| {
            let _ambient = GString::from("ambient");
            panic!("boom");
        });
    });

    assert_eq!(tracker.count(), 1);
    assert_eq!(live_handles(), before);
}

#[test]
fn guards_nest_as_ambient_scopes() {
    framework::init();
    let root = Scope::ambient();
    let scopes_before = open_scopes();

    let outer = ScopeGuard::enter();
    let outer_text = GString::from("outer");
    {
        let inner = ScopeGuard::enter();
        let inner_text = GString::from("inner");

        assert_eq!(Scope::ambient(), inner.scope());
        assert_eq!(inner_text.scope_id(), inner.scope().id());
        assert_eq!(open_scopes(), scopes_before + 2);
    }

    assert_eq!(Scope::ambient(), outer.scope());
    assert!(outer_text.is_alive());

    drop(outer);
    assert_eq!(Scope::ambient(), root);
    assert!(!outer_text.is_alive());
    assert_eq!(open_scopes(), scopes_before);
}

#[test]
fn errors_name_the_scope() {
    framework::init();

    let scope = Scope::begin_labeled("level-load");
    assert_eq!(scope.label().as_deref(), Some("level-load"));

    let text = GString::from_str_in(scope, "x");
    scope.end();

    let err = text.try_handle().expect_err("scope ended");
    assert_eq!(err.scope(), scope.id());
    assert!(err.to_string().contains(&scope.id().to_string()), "{err}");
}

#[test]
fn refcounted_scope_drops_one_reference() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let resource = Gd::<Resource>::new_in(scope);
    let id = instance_id_of(&resource);
    assert_eq!(resource.get_reference_count(), 1);

    // Someone else holds a reference: ending the scope must not free the object.
    mock::engine_reference(id);
    scope.end();

    assert!(mock::is_object_alive(id));
    assert_eq!(mock::reference_count(id), Some(1));
    assert_eq!(tracker.count(), 0);

    mock::engine_unreference(id);
    assert!(!mock::is_object_alive(id));
}

#[test]
fn last_reference_frees_refcounted() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let resource = Gd::<Resource>::new_in(scope);
    let id = instance_id_of(&resource);
    scope.end();

    assert!(!mock::is_object_alive(id));
    assert_eq!(tracker.objects_freed("Resource"), 1);
}
