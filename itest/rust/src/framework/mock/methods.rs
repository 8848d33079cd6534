/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine-side implementations of the bindable methods in `res/test_api.json`.
//!
//! Receivers are checked for liveness before dispatch, so `call.instance` of a non-static method refers to a live object.

use gdbind::sys::VariantType;

use super::{Call, MethodFn, Value, World};

/// Finds the implementation of `class_name::method_name`, returning names with static lifetime for the bind table.
pub(super) fn lookup(class_name: &str, method_name: &str) -> Option<(&'static str, &'static str, MethodFn)> {
    let found: (&'static str, &'static str, MethodFn) = match (class_name, method_name) {
        ("Object", "get_class") => ("Object", "get_class", object_get_class),
        ("Object", "is_class") => ("Object", "is_class", object_is_class),
        ("Object", "get_instance_id") => ("Object", "get_instance_id", object_get_instance_id),

        ("RefCounted", "get_reference_count") => ("RefCounted", "get_reference_count", refcounted_get_reference_count),
        ("RefCounted", "unreference") => ("RefCounted", "unreference", refcounted_unreference),

        ("Resource", "set_path") => ("Resource", "set_path", set_text),
        ("Resource", "get_path") => ("Resource", "get_path", get_text),
        ("Resource", "duplicate") => ("Resource", "duplicate", resource_duplicate),

        ("JSON", "parse_string") => ("JSON", "parse_string", json_parse_string),

        ("Node", "add_child") => ("Node", "add_child", node_add_child),
        ("Node", "get_child_count") => ("Node", "get_child_count", node_get_child_count),
        ("Node", "get_child") => ("Node", "get_child", node_get_child),
        ("Node", "get_parent") => ("Node", "get_parent", node_get_parent),
        ("Node", "set_name") => ("Node", "set_name", node_set_name),
        ("Node", "get_name") => ("Node", "get_name", node_get_name),
        ("Node", "find_children") => ("Node", "find_children", node_find_children),
        ("Node", "queue_free") => ("Node", "queue_free", node_queue_free),

        ("Label", "set_text") => ("Label", "set_text", set_text),
        ("Label", "get_text") => ("Label", "get_text", get_text),
        ("Label", "get_line_count") => ("Label", "get_line_count", label_get_line_count),

        _ => return None,
    };

    Some(found)
}

/// Receiver of a non-static call.
fn receiver(call: &Call) -> u64 {
    call.instance.unwrap_or_default()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object

unsafe fn object_get_class(world: &mut World, call: &Call) {
    let class_name = world
        .objects
        .get(&receiver(call))
        .map(|o| o.class_name.clone())
        .unwrap_or_default();

    call.ret_builtin(world, VariantType::String, Value::Text(class_name));
}

unsafe fn object_is_class(world: &mut World, call: &Call) {
    let class_name = call.arg_text(world, 0);
    let result = world.is_instance_of(receiver(call), &class_name);

    call.ret_bool(result);
}

unsafe fn object_get_instance_id(_world: &mut World, call: &Call) {
    call.ret_i64(receiver(call) as i64);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// RefCounted

unsafe fn refcounted_get_reference_count(world: &mut World, call: &Call) {
    let count = world.objects.get(&receiver(call)).map_or(0, |o| o.refcount);
    call.ret_i64(count);
}

/// Returns whether the last reference was dropped. Like the engine, leaves destruction to the caller.
unsafe fn refcounted_unreference(world: &mut World, call: &Call) {
    let died = match world.objects.get_mut(&receiver(call)) {
        Some(object) => {
            object.refcount -= 1;
            object.refcount <= 0
        }
        None => false,
    };

    call.ret_bool(died);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Text properties (Resource path, Label text)

unsafe fn set_text(world: &mut World, call: &Call) {
    let text = call.arg_text(world, 0);
    if let Some(object) = world.objects.get_mut(&receiver(call)) {
        object.text = text;
    }
}

unsafe fn get_text(world: &mut World, call: &Call) {
    let text = world
        .objects
        .get(&receiver(call))
        .map(|o| o.text.clone())
        .unwrap_or_default();

    call.ret_builtin(world, VariantType::String, Value::Text(text));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Resource, JSON

unsafe fn resource_duplicate(world: &mut World, call: &Call) {
    let Some((class_name, text)) = world
        .objects
        .get(&receiver(call))
        .map(|o| (o.class_name.clone(), o.text.clone()))
    else {
        call.ret_object(world, None);
        return;
    };

    let copy = world.construct(&class_name);
    if let Some(object) = copy.and_then(|id| world.objects.get_mut(&id)) {
        object.text = text;
    }

    call.ret_object(world, copy);
}

unsafe fn json_parse_string(world: &mut World, call: &Call) {
    let source = call.arg_text(world, 0);
    let source = source.trim();

    let (ty, payload) = match source {
        "null" => (VariantType::Nil, 0),
        "true" => (VariantType::Bool, 1),
        "false" => (VariantType::Bool, 0),
        _ => match source.parse::<i64>() {
            Ok(int) => (VariantType::Int, int),
            Err(_) => (VariantType::String, 0),
        },
    };

    call.ret_variant(world, ty, payload);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Node

unsafe fn node_add_child(world: &mut World, call: &Call) {
    if let Some(child) = call.arg_object(0) {
        world.attach(receiver(call), child);
    }
}

unsafe fn node_get_child_count(world: &mut World, call: &Call) {
    let count = world.objects.get(&receiver(call)).map_or(0, |o| o.children.len());
    call.ret_i64(count as i64);
}

unsafe fn node_get_child(world: &mut World, call: &Call) {
    let index = call.arg_i64(0);
    let child = world.objects.get(&receiver(call)).and_then(|o| {
        let len = o.children.len() as i64;
        let index = if index < 0 { len + index } else { index };

        usize::try_from(index).ok().and_then(|i| o.children.get(i).copied())
    });

    call.ret_object(world, child);
}

unsafe fn node_get_parent(world: &mut World, call: &Call) {
    let parent = world.objects.get(&receiver(call)).and_then(|o| o.parent);
    call.ret_object(world, parent);
}

unsafe fn node_set_name(world: &mut World, call: &Call) {
    let name = call.arg_text(world, 0);
    if let Some(object) = world.objects.get_mut(&receiver(call)) {
        object.name = name;
    }
}

unsafe fn node_get_name(world: &mut World, call: &Call) {
    let name = world
        .objects
        .get(&receiver(call))
        .map(|o| o.name.clone())
        .unwrap_or_default();

    call.ret_builtin(world, VariantType::StringName, Value::Text(name));
}

/// Descendants whose name matches a `*`/`?` pattern and, if non-empty, whose class inherits `type`. Ownership is not modeled, so
/// the `owned` flag is ignored.
unsafe fn node_find_children(world: &mut World, call: &Call) {
    let pattern = call.arg_text(world, 0);
    let type_filter = call.arg_text(world, 1);
    let recursive = call.arg_bool(2);

    let mut found = Vec::new();
    collect_matching(world, receiver(call), &pattern, &type_filter, recursive, &mut found);

    call.ret_builtin(world, VariantType::Array, Value::Objects(found));
}

fn collect_matching(
    world: &World,
    parent: u64,
    pattern: &str,
    type_filter: &str,
    recursive: bool,
    found: &mut Vec<u64>,
) {
    let Some(object) = world.objects.get(&parent) else {
        return;
    };

    for &child in &object.children {
        let Some(child_object) = world.objects.get(&child) else {
            continue;
        };

        let type_ok = type_filter.is_empty() || world.is_instance_of(child, type_filter);
        if type_ok && wildcard_match(pattern, &child_object.name) {
            found.push(child);
        }

        if recursive {
            collect_matching(world, child, pattern, type_filter, recursive, found);
        }
    }
}

/// Case-sensitive match where `*` stands for any sequence and `?` for any single character.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Frees immediately; the mock has no frame loop to defer to.
unsafe fn node_queue_free(world: &mut World, call: &Call) {
    world.destroy_tree(receiver(call));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Label

unsafe fn label_get_line_count(world: &mut World, call: &Call) {
    let lines = world
        .objects
        .get(&receiver(call))
        .map_or(0, |o| o.text.lines().count());

    call.ret_i64(lines.max(1) as i64);
}

#[cfg(test)]
mod tests {
    use super::wildcard_match;

    #[test]
    fn wildcard_patterns() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "Player"));
        assert!(wildcard_match("Enemy*", "Enemy2"));
        assert!(wildcard_match("*ne*", "Enemy"));
        assert!(wildcard_match("L?bel", "Label"));
        assert!(!wildcard_match("Enemy*", "Player"));
        assert!(!wildcard_match("L?bel", "Lbel"));
        assert!(!wildcard_match("", "Label"));
    }
}
