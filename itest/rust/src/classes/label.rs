/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::builtin::GString;
use gdbind::classes::Object;
use gdbind::init::InitLevel;
use gdbind::lifetime::{with_scope, Scope};
use gdbind::meta::Signature;
use gdbind::obj::{ErgonomicAccess, GodotClass, Inherits, Ownership, Raw, RawAccess};
use gdbind::sys::CachedMethodBind;

use crate::classes::Node;

/// Abstract base of 2D and GUI nodes. Cannot be instantiated.
pub struct CanvasItem {
    _private: (),
}

impl GodotClass for CanvasItem {
    type Base = Node;

    const CLASS_NAME: &'static str = "CanvasItem";
    const INIT_LEVEL: InitLevel = InitLevel::Scene;
}

gdbind::impl_inherits!(CanvasItem: Node, Object);

pub struct Control {
    _private: (),
}

impl GodotClass for Control {
    type Base = CanvasItem;

    const CLASS_NAME: &'static str = "Control";
    const INIT_LEVEL: InitLevel = InitLevel::Scene;
}

gdbind::impl_inherits!(Control: CanvasItem, Node, Object);

/// Displays plain text.
pub struct Label {
    _private: (),
}

impl GodotClass for Label {
    type Base = Control;

    const CLASS_NAME: &'static str = "Label";
    const INIT_LEVEL: InitLevel = InitLevel::Scene;
}

gdbind::impl_inherits!(Label: Control, CanvasItem, Node, Object);

static SET_TEXT: CachedMethodBind = CachedMethodBind::new("Label", "set_text");
static GET_TEXT: CachedMethodBind = CachedMethodBind::new("Label", "get_text");
static GET_LINE_COUNT: CachedMethodBind = CachedMethodBind::new("Label", "get_line_count");

pub trait LabelRaw: RawAccess<Class: Inherits<Label>> {
    fn set_text(&self, text: &GString) {
        // SAFETY: bind and signature match the class database; the receiver inherits Label.
        unsafe { Signature::<(&GString,), ()>::out_class_ptrcall(SET_TEXT.get(), "Label", "set_text", self, (text,)) }
    }

    fn get_text(&self, scope: Scope) -> GString {
        // SAFETY: see set_text().
        unsafe {
            Signature::<(), GString>::out_class_ptrcall_with(
                GET_TEXT.get(),
                "Label",
                "get_text",
                self,
                (),
                Ownership::Transferred,
                scope,
            )
        }
    }

    fn get_line_count(&self) -> i32 {
        // SAFETY: see set_text().
        unsafe {
            Signature::<(), i32>::out_class_ptrcall(GET_LINE_COUNT.get(), "Label", "get_line_count", self, ())
        }
    }
}

impl<T: Inherits<Label>> LabelRaw for Raw<'_, T> {}

pub trait LabelApi: ErgonomicAccess<Class: Inherits<Label>> {
    /// Sets the text through a temporary engine string, released right after the call.
    fn set_text(&self, text: &str) {
        // SAFETY: see LabelRaw::set_text().
        unsafe {
            Signature::<(&str,), ()>::out_class_ptrcall(SET_TEXT.get(), "Label", "set_text", &self.raw(), (text,))
        }
    }

    fn get_text(&self) -> String {
        with_scope(|scope| self.raw().get_text(scope).to_string())
    }

    fn get_line_count(&self) -> i32 {
        self.raw().get_line_count()
    }
}

impl<T: ErgonomicAccess<Class: Inherits<Label>>> LabelApi for T {}
