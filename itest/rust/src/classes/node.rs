/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::builtin::{Array, GString, StringName};
use gdbind::classes::Object;
use gdbind::init::InitLevel;
use gdbind::lifetime::{with_scope, Scope};
use gdbind::meta::{Signature, TransferToEngine};
use gdbind::obj::{ErgonomicAccess, Gd, GodotClass, Inherits, Ownership, Raw, RawAccess};
use gdbind::sys::CachedMethodBind;

/// Base class of everything in the scene tree. Not reference-counted: once added to a parent, the tree owns it.
pub struct Node {
    _private: (),
}

impl GodotClass for Node {
    type Base = Object;

    const CLASS_NAME: &'static str = "Node";
    const INIT_LEVEL: InitLevel = InitLevel::Scene;
}

gdbind::impl_inherits!(Node: Object);

/// `Node.InternalMode.INTERNAL_MODE_DISABLED`.
const INTERNAL_MODE_DISABLED: i64 = 0;

static ADD_CHILD: CachedMethodBind = CachedMethodBind::new("Node", "add_child");
static GET_CHILD_COUNT: CachedMethodBind = CachedMethodBind::new("Node", "get_child_count");
static GET_CHILD: CachedMethodBind = CachedMethodBind::new("Node", "get_child");
static GET_PARENT: CachedMethodBind = CachedMethodBind::new("Node", "get_parent");
static SET_NAME: CachedMethodBind = CachedMethodBind::new("Node", "set_name");
static GET_NAME: CachedMethodBind = CachedMethodBind::new("Node", "get_name");
static FIND_CHILDREN: CachedMethodBind = CachedMethodBind::new("Node", "find_children");
static QUEUE_FREE: CachedMethodBind = CachedMethodBind::new("Node", "queue_free");

pub trait NodeRaw: RawAccess<Class: Inherits<Node>> {
    /// Adds `node` as child. If Rust owned it, the tree owns it after the call.
    fn add_child<C: Inherits<Node>>(&self, node: TransferToEngine<'_, C>, force_readable_name: bool) {
        // SAFETY: bind and signature match the class database; the receiver inherits Node.
        unsafe {
            Signature::<(TransferToEngine<'_, C>, bool, i64), ()>::out_class_ptrcall(
                ADD_CHILD.get(),
                "Node",
                "add_child",
                self,
                (node, force_readable_name, INTERNAL_MODE_DISABLED),
            )
        }
    }

    fn get_child_count(&self, include_internal: bool) -> i32 {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(bool,), i32>::out_class_ptrcall(
                GET_CHILD_COUNT.get(),
                "Node",
                "get_child_count",
                self,
                (include_internal,),
            )
        }
    }

    /// Child at `idx`, negative values counting from the end. Borrowed from the tree.
    fn get_child(&self, idx: i32, include_internal: bool) -> Option<Gd<Node>> {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(i32, bool), Option<Gd<Node>>>::out_class_ptrcall(
                GET_CHILD.get(),
                "Node",
                "get_child",
                self,
                (idx, include_internal),
            )
        }
    }

    fn get_parent(&self) -> Option<Gd<Node>> {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(), Option<Gd<Node>>>::out_class_ptrcall(GET_PARENT.get(), "Node", "get_parent", self, ())
        }
    }

    fn set_name(&self, name: &StringName) {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(&StringName,), ()>::out_class_ptrcall(SET_NAME.get(), "Node", "set_name", self, (name,))
        }
    }

    fn get_name(&self, scope: Scope) -> StringName {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(), StringName>::out_class_ptrcall_with(
                GET_NAME.get(),
                "Node",
                "get_name",
                self,
                (),
                Ownership::Transferred,
                scope,
            )
        }
    }

    /// Descendants whose name matches `pattern` and whose class inherits `type_` (any class if empty).
    fn find_children(&self, pattern: &GString, type_: &str, recursive: bool, owned: bool, scope: Scope) -> Array {
        // SAFETY: see add_child().
        unsafe {
            Signature::<(&GString, &str, bool, bool), Array>::out_class_ptrcall_with(
                FIND_CHILDREN.get(),
                "Node",
                "find_children",
                self,
                (pattern, type_, recursive, owned),
                Ownership::Transferred,
                scope,
            )
        }
    }

    /// Asks the engine to free the node. The engine decides when; Rust must not release it afterwards.
    fn queue_free(&self) {
        // SAFETY: see add_child().
        unsafe { Signature::<(), ()>::out_class_ptrcall(QUEUE_FREE.get(), "Node", "queue_free", self, ()) }
    }
}

impl<T: Inherits<Node>> NodeRaw for Raw<'_, T> {}

pub trait NodeApi: ErgonomicAccess<Class: Inherits<Node>> {
    fn add_child<C: Inherits<Node>>(&self, node: &Gd<C>) {
        self.raw().add_child(TransferToEngine(node), false)
    }

    fn get_child_count(&self) -> i32 {
        self.raw().get_child_count(false)
    }

    fn get_child(&self, idx: i32) -> Option<Gd<Node>> {
        self.raw().get_child(idx, false)
    }

    fn get_parent(&self) -> Option<Gd<Node>> {
        self.raw().get_parent()
    }

    fn set_name(&self, name: &str) {
        with_scope(|scope| {
            let name = StringName::from_str_in(scope, name);
            self.raw().set_name(&name)
        })
    }

    fn get_name(&self) -> String {
        with_scope(|scope| self.raw().get_name(scope).to_string())
    }

    /// Recursive search among all descendants. The result lives in the ambient scope.
    fn find_children(&self, pattern: &str) -> Array {
        let target = Scope::ambient();

        with_scope(|scope| {
            let pattern = GString::from_str_in(scope, pattern);
            self.raw().find_children(&pattern, "", true, true, target)
        })
    }

    fn queue_free(&self) {
        self.raw().queue_free()
    }
}

impl<T: ErgonomicAccess<Class: Inherits<Node>>> NodeApi for T {}
