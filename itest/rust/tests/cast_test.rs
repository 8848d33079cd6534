/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::lifetime::EndOutcome;
use gdbind::prelude::*;

use itest::classes::{Control, Label, LabelApi, Node, NodeApi, Resource};
use itest::framework::mock::{self, FreeTracker};
use itest::framework::{self, expect_panic, instance_id_of};

fn instance_id(id: u64) -> InstanceId {
    InstanceId::try_from_u64(id).expect("valid instance ID")
}

#[test]
fn upcast_keeps_ownership() {
    framework::init();
    let tracker = FreeTracker::start();

    let scope = Scope::begin();
    let label = Gd::<Label>::new_in(scope);
    let key = label.handle_key();

    let node: Gd<Node> = label.upcast();
    assert!(node.is_owned());
    assert_eq!(node.handle_key(), key);
    assert_eq!(node.get_class(), "Label");

    let object = node.upcast::<Object>();
    assert!(object.is_class("CanvasItem"));

    assert!(matches!(scope.end(), EndOutcome::Ended(1)));
    assert_eq!(tracker.objects_freed("Label"), 1);
}

#[test]
fn as_kind_views_without_changing_ownership() {
    framework::init();

    with_scope(|scope| {
        let node: Gd<Node> = Gd::<Label>::new().upcast();

        let view = node.as_kind::<Label>().expect("node is a Label");
        view.set_text("viewed");
        assert_eq!(view.get_text(), "viewed");
        assert_eq!(view.instance_id(), node.instance_id());

        assert!(node.as_kind::<Control>().is_some());
        assert!(node.as_kind::<Resource>().is_none());

        assert!(node.is_owned());
        assert_eq!(scope.len(), 1);
    });
}

#[test]
fn try_cast_returns_original_on_failure() {
    framework::init();

    let id = mock::spawn_engine_object("Control", "Panel");
    let node = Gd::<Node>::try_from_instance_id(instance_id(id)).expect("live node");

    let node = node.try_cast::<Label>().expect_err("a Control is no Label");
    assert_eq!(node.get_child_count(), 0);

    let control = node.try_cast::<Control>().expect("a Control");
    assert!(!control.is_owned());
    assert_eq!(instance_id_of(&control), id);

    expect_panic("downcast to unrelated class", || {
        let _ = control.upcast::<Node>().cast::<Label>();
    });

    mock::engine_free(id);
}

#[test]
fn downcast_of_owned_object_stays_owned() {
    framework::init();

    with_scope(|scope| {
        let object: Gd<Object> = Gd::<Label>::new().upcast();
        let label = object.cast::<Label>();

        assert!(label.is_owned());
        assert_eq!(label.get_line_count(), 1);
        assert_eq!(scope.len(), 1);
    });
}

#[test]
fn lookup_by_instance_id_checks_class() {
    framework::init();

    with_scope(|_| {
        let resource = Gd::<Resource>::new();
        let label = Gd::<Label>::new();

        let resource_id = resource.instance_id();
        let label_id = label.instance_id();
        assert!(resource_id.is_ref_counted());
        assert!(!label_id.is_ref_counted());

        assert!(Gd::<Node>::try_from_instance_id(resource_id).is_none());

        let engine_view = Gd::<Node>::try_from_instance_id(label_id).expect("a Label is a Node");
        assert!(!engine_view.is_owned());
        assert_eq!(engine_view.instance_id(), label_id);
    });

    assert!(Gd::<Object>::try_from_instance_id(instance_id(u64::MAX >> 2)).is_none());
}
