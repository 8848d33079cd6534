/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::Any;
use std::cell::Cell;

use gdbind::classes::Object;
use gdbind::meta::error::ClassRegistryError;
use gdbind::obj::Gd;
use gdbind::registry::{ClassRecord, VirtualTable};
use gdbind::sys;

use crate::classes::Node;

pub const PLAYER_CLASS: &str = "Player";

thread_local! {
    static READY_CALLS: Cell<u32> = const { Cell::new(0) };
    static PROCESS_TIME: Cell<f64> = const { Cell::new(0.0) };
}

/// Extension class deriving from `Node`, overriding `_ready` and `_process`.
pub struct Player {
    pub base: Gd<Node>,
}

impl Player {
    /// Registration record, with the overridden virtual methods.
    pub fn class_record() -> Result<ClassRecord, ClassRegistryError> {
        let virtuals = VirtualTable::builder(PLAYER_CLASS, "Node")
            .method("_ready", ready)
            .method("_process", process)
            .build()?;

        Ok(ClassRecord::new(PLAYER_CLASS, wrap_player).with_virtuals(virtuals))
    }
}

fn wrap_player(object: Gd<Object>) -> Box<dyn Any> {
    Box::new(Player {
        base: object.cast::<Node>(),
    })
}

/// Number of `_ready` calls on this thread.
pub fn ready_calls() -> u32 {
    READY_CALLS.get()
}

/// Sum of `delta` over all `_process` calls on this thread.
pub fn process_time() -> f64 {
    PROCESS_TIME.get()
}

unsafe extern "C" fn ready(
    _instance: sys::GDExtensionClassInstancePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
) {
    READY_CALLS.set(READY_CALLS.get() + 1);
}

unsafe extern "C" fn process(
    _instance: sys::GDExtensionClassInstancePtr,
    args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
) {
    let delta = *(*args as *const f64);
    PROCESS_TIME.set(PROCESS_TIME.get() + delta);
}
