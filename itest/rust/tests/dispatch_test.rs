/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::meta::trace;
use gdbind::prelude::*;
use gdbind::sys::VariantType;

use itest::classes::{Json, Label, LabelApi, Node};
use itest::framework::mock::{self, FreeEvent, FreeTracker};
use itest::framework::{self, expect_panic, instance_id_of};

#[test]
fn outbound_call_is_traced() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        label.get_line_count();

        let report = trace::pop();
        assert_eq!(report.class, "Label");
        assert_eq!(report.method, "get_line_count");
        assert!(!report.is_inbound);
        assert!(report.is_ptrcall);
    });
}

#[test]
fn static_call_is_traced() {
    framework::init();

    with_scope(|_| {
        Json::parse_string("null");

        let report = trace::pop();
        assert_eq!(report.class, "JSON");
        assert_eq!(report.method, "parse_string");
    });
}

#[test]
fn object_methods_see_dynamic_class() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();

        assert_eq!(label.get_class(), "Label");
        assert!(label.is_class("Control"));
        assert!(label.is_class("Node"));
        assert!(!label.is_class("Resource"));

        assert_eq!(label.raw().get_instance_id() as u64, instance_id_of(&label));

        let object = label.upcast::<Object>();
        assert_eq!(object.get_class(), "Label");
    });
}

#[test]
fn ergonomic_call_frees_its_temporaries() {
    framework::init();

    with_scope(|_| {
        let label = Gd::<Label>::new();
        let tracker = FreeTracker::start();

        let class_name = label.get_class();
        assert_eq!(class_name, "Label");
        assert_eq!(tracker.events(), [FreeEvent::Builtin(VariantType::String)]);
    });
}

#[test]
fn raw_call_returns_into_given_scope() {
    framework::init();

    let label = Gd::<Label>::new_in(Scope::ambient());
    let target = Scope::begin();

    let class_name = label.raw().get_class(target);
    assert_eq!(class_name.scope_id(), target.id());
    assert_eq!(mock::text_of(class_name.handle().words()[0]).as_deref(), Some("Label"));

    target.end();
    assert!(!class_name.is_alive());
    assert!(label.is_instance_valid());

    label.release();
}

#[test]
fn parse_string_yields_variants() {
    framework::init();

    with_scope(|scope| {
        assert!(Json::parse_string("null").is_nil());
        assert_eq!(Json::parse_string("true").get_type(), VariantType::Bool);
        assert_eq!(Json::parse_string(" 42 ").get_type(), VariantType::Int);
        assert_eq!(Json::parse_string("\"text\"").get_type(), VariantType::String);

        let parsed = Json::parse_string("-17");
        let id = parsed.handle().words()[1];
        assert_eq!(mock::variant_of(id), Some((VariantType::Int, -17)));

        let parsed = Json::parse_string("false");
        assert_eq!(mock::variant_of(parsed.handle().words()[1]), Some((VariantType::Bool, 0)));

        assert_eq!(scope.len(), 6);
    });
}

#[test]
fn call_on_freed_object_panics() {
    framework::init();

    let id = mock::spawn_engine_object("Label", "Transient");
    let label = Gd::<Label>::try_from_instance_id(InstanceId::try_from_u64(id).expect("valid ID")).expect("live label");
    assert_eq!(label.get_line_count(), 1);

    mock::engine_free(id);
    assert!(!label.is_instance_valid());
    assert!(label.try_object_handle().is_err());

    expect_panic("call on freed object", || {
        label.get_line_count();
    });

    assert!(Gd::<Node>::try_from_instance_id(InstanceId::try_from_u64(id).expect("valid ID")).is_none());
}
