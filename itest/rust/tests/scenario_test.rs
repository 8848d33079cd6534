/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! End-to-end flows: engine-owned scene, scoped temporaries, and what remains accessible afterwards.

use gdbind::lifetime::EndOutcome;
use gdbind::meta::error::LifetimeError;
use gdbind::prelude::*;
use gdbind::sys::VariantType;

use itest::classes::{Node, NodeApi, NodeRaw};
use itest::framework::mock::{self, FreeEvent, FreeTracker};
use itest::framework::{self, expect_panic};

fn engine_node(instance_id: u64) -> Gd<Node> {
    let id = InstanceId::try_from_u64(instance_id).expect("valid instance ID");
    Gd::try_from_instance_id(id).expect("live node")
}

#[test]
fn find_children_frees_everything_at_scope_end() {
    framework::init();

    let level = mock::spawn_engine_object("Node", "Level");
    let enemy = mock::spawn_engine_object("Node", "Enemy");
    let wall = mock::spawn_engine_object("Node", "Wall");
    mock::engine_add_child(level, enemy);
    mock::engine_add_child(level, wall);

    let parent = engine_node(level);
    assert!(!parent.is_owned());

    let tracker = FreeTracker::start();
    let scope = Scope::begin_labeled("search");

    let pattern = GString::from_str_in(scope, "Enemy*");
    let found = parent.raw().find_children(&pattern, "", true, true, scope);

    // Only the temporary type filter is gone; pattern and result belong to the scope.
    assert_eq!(tracker.events(), [FreeEvent::Builtin(VariantType::String)]);
    assert_eq!(mock::array_items(found.handle().words()[0]), Some(vec![enemy]));
    assert_eq!(scope.len(), 2);

    assert!(matches!(scope.end(), EndOutcome::Ended(2)));

    let events = tracker.events();
    assert_eq!(events.len(), 3);
    assert!(events.contains(&FreeEvent::Builtin(VariantType::Array)));
    assert_eq!(
        events
            .iter()
            .filter(|&e| *e == FreeEvent::Builtin(VariantType::String))
            .count(),
        2
    );
    assert_eq!(tracker.bad_frees(), 0);

    assert!(matches!(pattern.try_handle(), Err(LifetimeError::UseAfterEnd { .. })));
    assert!(matches!(found.try_handle(), Err(LifetimeError::UseAfterEnd { .. })));
    expect_panic("array used after its scope ended", || {
        found.handle();
    });

    // Engine-owned nodes are untouched.
    assert!(mock::is_object_alive(level));
    assert!(mock::is_object_alive(enemy));
    assert_eq!(parent.get_child_count(), 2);

    mock::engine_free(level);
}

#[test]
fn double_end_is_harmless() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let text = GString::from_str_in(scope, "short-lived");

    assert!(matches!(scope.end(), EndOutcome::Ended(1)));
    assert_eq!(tracker.count(), 1);

    assert!(matches!(scope.end(), EndOutcome::AlreadyEnded));
    assert_eq!(tracker.count(), 1);
    assert_eq!(tracker.bad_frees(), 0);

    assert!(matches!(text.try_handle(), Err(LifetimeError::UseAfterEnd { .. })));
}

#[test]
fn ergonomic_search_leaves_one_result() {
    framework::init();

    let level = mock::spawn_engine_object("Node", "Level");
    let room = mock::spawn_engine_object("Node", "Room");
    let enemy_a = mock::spawn_engine_object("Node", "EnemyA");
    let enemy_b = mock::spawn_engine_object("Node", "EnemyB");
    mock::engine_add_child(level, room);
    mock::engine_add_child(room, enemy_a);
    mock::engine_add_child(level, enemy_b);

    let parent = engine_node(level);

    with_scope(|scope| {
        let found = parent.find_children("Enemy?");

        assert_eq!(found.scope_id(), scope.id());
        assert_eq!(scope.len(), 1);
        assert_eq!(mock::array_items(found.handle().words()[0]), Some(vec![enemy_a, enemy_b]));
    });

    mock::engine_free(level);
}
