/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::builtin::Variant;
use gdbind::classes::{Object, RefCounted};
use gdbind::init::InitLevel;
use gdbind::meta::Signature;
use gdbind::obj::GodotClass;
use gdbind::sys::CachedMethodBind;

use crate::classes::Resource;

/// JSON parser. Only the static API is bound.
pub struct Json {
    _private: (),
}

impl GodotClass for Json {
    type Base = Resource;

    const CLASS_NAME: &'static str = "JSON";
    const INIT_LEVEL: InitLevel = InitLevel::Scene;
}

gdbind::impl_inherits!(Json: Resource, RefCounted, Object);

static PARSE_STRING: CachedMethodBind = CachedMethodBind::new("JSON", "parse_string");

impl Json {
    /// Parses `json_string` into a variant, owned by the ambient scope.
    pub fn parse_string(json_string: &str) -> Variant {
        // SAFETY: static bind; signature matches the class database.
        unsafe {
            Signature::<(&str,), Variant>::out_static_ptrcall(PARSE_STRING.get(), "JSON", "parse_string", (json_string,))
        }
    }
}
