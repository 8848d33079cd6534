/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::meta::error::ClassRegistryError;
use gdbind::prelude::*;
use gdbind::registry::class::{
    call_virtual, construct_by_name, get_virtual, is_frozen, is_registered, register_class, registered_count,
    virtual_method_id, wrap_dynamic, wrap_dynamic_as,
};
use gdbind::registry::{ClassRecord, VirtualTable};
use gdbind::sys;

use itest::classes::{self, Json, Label, Node, Player, PLAYER_CLASS};
use itest::framework::{self, instance_id_of, mock};

unsafe extern "C" fn noop(
    _instance: sys::GDExtensionClassInstancePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
) {
}

fn engine_object(instance_id: u64) -> Gd<Object> {
    let id = InstanceId::try_from_u64(instance_id).expect("valid instance ID");
    Gd::try_from_instance_id(id).expect("live object")
}

#[test]
fn classes_of_all_levels_are_registered() {
    framework::init();

    assert!(is_frozen());
    for class_name in ["Object", "RefCounted", "Resource", "Node", "Label", "JSON", PLAYER_CLASS] {
        assert!(is_registered(class_name), "{class_name} not registered");
    }

    assert!(!is_registered("CanvasItem"));
    assert_eq!(registered_count(), 7);
}

#[test]
fn registration_after_init_is_rejected() {
    framework::init();

    let err = register_class(ClassRecord::of::<Node>(), InitLevel::Scene).expect_err("registry frozen");
    assert_eq!(
        err,
        ClassRegistryError::Frozen {
            class_name: "Node".to_string()
        }
    );
}

#[test]
fn construct_by_name_uses_registered_wrapper() {
    framework::init();

    with_scope(|scope| {
        let wrapped = construct_by_name("Label", scope).expect("Label is constructible");
        let label = wrapped.downcast::<Gd<Label>>().expect("registered as Gd<Label>");

        assert!(label.is_owned());
        assert_eq!(label.get_class(), "Label");
        assert_eq!(scope.len(), 1);
    });
}

#[test]
fn construct_by_name_errors() {
    framework::init();

    with_scope(|scope| {
        assert_eq!(
            construct_by_name("CanvasItem", scope).err(),
            Some(ClassRegistryError::UnknownClass {
                class_name: "CanvasItem".to_string()
            })
        );

        // Registered, but not a class the engine can construct.
        assert_eq!(
            construct_by_name(PLAYER_CLASS, scope).err(),
            Some(ClassRegistryError::NotInstantiable {
                class_name: PLAYER_CLASS.to_string()
            })
        );

        assert!(scope.is_empty());
    });
}

#[test]
fn wrap_dynamic_resolves_nearest_registered_ancestor() {
    framework::init();

    let control = mock::spawn_engine_object("Control", "Panel");
    let label = mock::spawn_engine_object("Label", "Title");

    with_scope(|_| {
        let node = wrap_dynamic_as::<Gd<Node>>(engine_object(control))
            .expect("Node is registered")
            .expect("wrapped as Gd<Node>");
        assert_eq!(instance_id_of(&node), control);

        let label_gd = wrap_dynamic(engine_object(label))
            .expect("Label is registered")
            .downcast::<Gd<Label>>()
            .expect("wrapped as Gd<Label>");
        assert_eq!(instance_id_of(&*label_gd), label);

        // Wrapped by the Label thunk, so a different target type does not match.
        assert!(wrap_dynamic_as::<Gd<Json>>(engine_object(label))
            .expect("Label is registered")
            .is_none());
    });

    mock::engine_free(control);
    mock::engine_free(label);
}

#[test]
fn player_virtuals_are_dispatched() {
    framework::init();

    let ready = get_virtual(PLAYER_CLASS, "_ready").expect("_ready overridden");
    let ready_before = classes::ready_calls();

    // SAFETY: _ready ignores instance, arguments and return.
    unsafe { ready(std::ptr::null_mut(), std::ptr::null(), std::ptr::null_mut()) };
    assert_eq!(classes::ready_calls(), ready_before + 1);

    let process_id = virtual_method_id(PLAYER_CLASS, "_process").expect("_process overridden");
    let delta = 0.25f64;
    let args = [&delta as *const f64 as sys::GDExtensionConstTypePtr];
    let time_before = classes::process_time();

    // SAFETY: _process reads one f64 argument.
    unsafe { call_virtual(PLAYER_CLASS, process_id, std::ptr::null_mut(), args.as_ptr(), std::ptr::null_mut()) }
        .expect("call _process");
    assert_eq!(classes::process_time(), time_before + 0.25);

    assert!(get_virtual(PLAYER_CLASS, "_draw").is_none());
    assert!(get_virtual("Label", "_ready").is_none());
    assert!(matches!(
        virtual_method_id(PLAYER_CLASS, "_physics_process"),
        Err(ClassRegistryError::UnknownVirtual { .. })
    ));
}

#[test]
fn player_thunk_wraps_base_node() {
    framework::init();

    let id = mock::spawn_engine_object("Node", "Hero");
    let record = Player::class_record().expect("valid Player record");
    assert_eq!(record.class_name(), PLAYER_CLASS);
    assert_eq!(record.virtuals().map(VirtualTable::len), Some(2));

    let player = (record.construct_thunk())(engine_object(id))
        .downcast::<Player>()
        .expect("thunk produces Player");
    assert_eq!(instance_id_of(&player.base), id);

    // The engine reports the native class of a plain node, so the Node wrapper applies there.
    let wrapped = wrap_dynamic(engine_object(id)).expect("Node is registered");
    assert!(wrapped.downcast_ref::<Gd<Node>>().is_some());
    assert!(wrapped.downcast_ref::<Player>().is_none());

    mock::engine_free(id);
}

#[test]
fn virtual_tables_are_validated() {
    framework::init();

    let table = VirtualTable::builder("Sprite", "CanvasItem")
        .method("_draw", noop)
        .method("_ready", noop)
        .build()
        .expect("inherited virtuals are valid");
    assert_eq!(table.len(), 2);
    assert!(table.get_virtual("_ready").is_some());

    assert_eq!(
        VirtualTable::builder("Walker", "Node")
            .method("_draw", noop)
            .build()
            .err(),
        Some(ClassRegistryError::UnknownVirtual {
            class_name: "Walker".to_string(),
            method_name: "_draw".to_string(),
        })
    );

    assert_eq!(
        VirtualTable::builder("Walker", "Node")
            .method("_ready", noop)
            .method("_ready", noop)
            .build()
            .err(),
        Some(ClassRegistryError::DuplicateVirtual {
            class_name: "Walker".to_string(),
            method_name: "_ready".to_string(),
        })
    );
}
