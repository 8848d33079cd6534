/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::lifetime::{self, EndOutcome, HandleState};
use gdbind::meta::error::{CallErrorReason, LifetimeError};
use gdbind::meta::live_frames;
use gdbind::prelude::*;
use gdbind::sys::{CachedMethodBind, VariantType};

use itest::classes::{Label, LabelApi};
use itest::framework::mock::{self, FreeEvent, FreeTracker, MessageLevel};
use itest::framework::{self, expect_panic, instance_id_of};

static SET_TEXT: CachedMethodBind = CachedMethodBind::new("Label", "set_text");
static GET_TEXT: CachedMethodBind = CachedMethodBind::new("Label", "get_text");
static GET_LINE_COUNT: CachedMethodBind = CachedMethodBind::new("Label", "get_line_count");

fn errors_containing(needle: &str) -> usize {
    mock::take_messages()
        .iter()
        .filter(|m| m.level == MessageLevel::Error && m.text.contains(needle))
        .count()
}

#[test]
fn frames_are_balanced_after_calls() {
    framework::init();
    let before = live_frames();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        label.set_text("one\ntwo");

        assert_eq!(label.get_text(), "one\ntwo");
        assert_eq!(label.get_line_count(), 2);
    });

    assert_eq!(live_frames(), before);
}

#[test]
fn borrowed_argument_blocks_release_and_end() {
    framework::init();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "borrowed");
    let label = Gd::<Label>::new_in(scope);

    {
        let mut frame = Frame::for_method("Label", "set_text");
        frame.arg(&text);

        assert_eq!(text.state(), HandleState::Borrowed(1));
        assert!(matches!(
            lifetime::try_release(text.key()),
            Err(LifetimeError::HandleBorrowed { borrows: 1, .. })
        ));
        assert!(matches!(
            scope.try_end(),
            Err(LifetimeError::EndWhileBorrowed { borrowed: 1, .. })
        ));

        let ret = frame.ret::<()>();
        // SAFETY: set_text takes one string and returns nothing; the receiver is a Label.
        unsafe { frame.dispatch(SET_TEXT.get(), &label) };
        frame.get(ret);

        // The receiver is lent as well while the frame lives.
        assert_eq!(label.handle_key().map(lifetime::handle_state), Some(HandleState::Borrowed(1)));
    }

    assert_eq!(text.state(), HandleState::Registered);
    assert!(matches!(scope.end(), EndOutcome::Ended(2)));
}

#[test]
fn dispatch_twice_is_rejected() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();

        let mut frame = Frame::for_method("Label", "get_line_count");
        let ret = frame.ret::<i32>();

        // SAFETY: get_line_count takes no arguments and returns an int.
        unsafe { frame.dispatch(GET_LINE_COUNT.get(), &label) };
        assert!(frame.is_dispatched());

        // SAFETY: as above.
        let err = unsafe { frame.try_dispatch(GET_LINE_COUNT.get(), &label) }.expect_err("second dispatch");
        assert_eq!(err.reason(), &CallErrorReason::AlreadyDispatched);
        assert_eq!(err.class_name(), Some("Label"));
        assert_eq!(err.method_name(), Some("get_line_count"));

        assert_eq!(frame.get(ret), 1);
    });
}

#[cfg(debug_assertions)]
#[test]
fn argument_count_is_checked_before_the_call() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        label.set_text("unchanged");

        let mut frame = Frame::for_method("Label", "set_text");
        frame.arg("first").arg("second");
        let _ret = frame.ret::<()>();

        // SAFETY: the bind is a Label method; the argument count is rejected before the engine is reached.
        let err = unsafe { frame.try_dispatch(SET_TEXT.get(), &label) }.expect_err("too many arguments");
        assert_eq!(
            err.reason(),
            &CallErrorReason::ArgCountMismatch {
                expected: 1,
                actual: 2
            }
        );
        assert!(!frame.is_dispatched());
        drop(frame);

        assert_eq!(label.get_text(), "unchanged");
    });
}

#[test]
fn temporaries_are_released_with_the_frame() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        let tracker = FreeTracker::start();

        {
            let mut frame = Frame::for_method("Label", "set_text");
            frame.arg("from a str");
            let ret = frame.ret::<()>();

            // SAFETY: set_text takes one string and returns nothing; the receiver is a Label.
            unsafe { frame.dispatch(SET_TEXT.get(), &label) };
            frame.get(ret);

            assert_eq!(tracker.count(), 0);
        }

        assert_eq!(tracker.events(), [FreeEvent::Builtin(VariantType::String)]);
        assert_eq!(label.get_text(), "from a str");
    });
}

#[test]
fn unread_owned_return_is_released() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        label.set_text("never read");

        mock::take_messages();
        let tracker = FreeTracker::start();

        {
            let mut frame = Frame::for_method("Label", "get_text");
            let _ret = frame.ret::<GString>();

            // SAFETY: get_text takes no arguments and returns a string.
            unsafe { frame.dispatch(GET_TEXT.get(), &label) };
        }

        assert_eq!(tracker.events(), [FreeEvent::Builtin(VariantType::String)]);
        assert_eq!(tracker.bad_frees(), 0);
        assert_eq!(errors_containing("owned return value was never read"), 1);
    });
}

#[test]
fn discarded_return_is_released_silently() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        mock::take_messages();
        let tracker = FreeTracker::start();

        let mut frame = Frame::for_method("Label", "get_text");
        let ret = frame.ret::<GString>();

        // SAFETY: get_text takes no arguments and returns a string.
        unsafe { frame.dispatch(GET_TEXT.get(), &label) };
        frame.discard(ret);
        frame.free();

        assert_eq!(tracker.count(), 1);
        assert_eq!(errors_containing("never read"), 0);
    });
}

#[test]
fn return_read_before_dispatch_fails() {
    framework::init();
    mock::take_messages();

    let tracker = FreeTracker::start();
    let mut frame = Frame::for_method("Label", "get_text");
    let ret = frame.ret::<GString>();

    let err = frame.try_get_in(ret, Scope::ambient()).expect_err("not dispatched");
    assert_eq!(err.reason(), &CallErrorReason::NotDispatched);
    drop(frame);

    // The slot was initialized for the engine to assign into; it is freed without complaint.
    assert_eq!(tracker.count(), 1);
    assert_eq!(errors_containing("never read"), 0);
}

#[test]
fn return_into_ended_scope_is_released() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        let ended = Scope::begin();
        ended.end();

        let tracker = FreeTracker::start();
        let mut frame = Frame::for_method("Label", "get_text");
        let ret = frame.ret::<GString>();

        // SAFETY: get_text takes no arguments and returns a string.
        unsafe { frame.dispatch(GET_TEXT.get(), &label) };

        let err = frame.try_get_in(ret, ended).expect_err("scope ended");
        assert!(matches!(
            err.reason(),
            CallErrorReason::Lifetime(LifetimeError::RegisterIntoEnded { .. })
        ));
        assert_eq!(tracker.count(), 1);

        drop(frame);
        assert_eq!(tracker.count(), 1);
    });
}

#[test]
fn dead_receiver_is_not_called() {
    framework::init();

    let scope = Scope::begin();
    let label = Gd::<Label>::new_in(scope);
    let id = instance_id_of(&label);
    mock::engine_free(id);

    let mut frame = Frame::for_method("Label", "get_line_count");
    let _ret = frame.ret::<i32>();

    // SAFETY: get_line_count takes no arguments and returns an int.
    let err = unsafe { frame.try_dispatch(GET_LINE_COUNT.get(), &label) }.expect_err("dead receiver");
    assert_eq!(
        err.reason(),
        &CallErrorReason::DeadObject {
            instance_id: InstanceId::try_from_u64(id).expect("valid ID"),
        }
    );
    drop(frame);

    assert_eq!(label.handle_key().map(lifetime::handle_state), Some(HandleState::Registered));
    scope.end();
}

#[test]
fn panic_while_building_returns_borrows() {
    framework::init();
    let before = live_frames();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "panic");

    expect_panic("panic with a live frame", || {
        let mut frame = Frame::for_method("Label", "set_text");
        frame.arg(&text);
        panic!("interrupted");
    });

    assert_eq!(live_frames(), before);
    assert_eq!(text.state(), HandleState::Registered);
    assert!(matches!(scope.end(), EndOutcome::Ended(1)));
}

#[test]
fn released_argument_cannot_be_pushed() {
    framework::init();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "gone");
    scope.end();

    expect_panic("argument of ended scope", || {
        let mut frame = Frame::for_method("Label", "set_text");
        frame.arg(&text);
    });
}
