/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Low level bindings to the GDExtension C interface.
//!
//! # Internal crate
//! **Do not depend on this crate directly, instead use the `gdbind` crate.**
//!
//! No SemVer or other guarantees are provided.
//!
//! Contents:
//! - C types and the [`EngineInterface`] table loaded through `get_proc_address`.
//! - Binding storage: interface, class database, builtin lifecycle functions and per-level method tables.
//! - [`CachedMethodBind`], resolving a `(class, method, hash)` triple once per call site.

#![allow(clippy::missing_safety_doc)]

mod assertions;
mod binding;
mod builtin_lifecycle;
mod extension_api;
mod global;
mod init_level;
mod interface;
mod method_table;
mod opaque;
mod string_cache;
mod toolbox;

pub mod types;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Public re-exports

pub use binding::{
    builtin_lifecycle_api, class_db, class_method_table, config, find_method_bind, get_interface, get_library,
    godot_version, initialize, is_initialized, is_level_loaded, load_class_method_table, BindingConfig,
};
pub use builtin_lifecycle::{BuiltinConstructor, BuiltinDestructor, BuiltinLifecycleTable};
pub use extension_api::{
    ApiLoadError, ClassDb, ClassInfo, JsonClass, JsonClassMethod, JsonExtensionApi, JsonHeader, JsonMethodArg,
    JsonMethodReturn, MethodInfo,
};
pub use global::{Global, GlobalGuard, GlobalReadGuard};
pub use init_level::InitLevel;
pub use interface::{read_godot_version, EngineInterface, GodotVersion};
pub use method_table::{CachedMethodBind, ClassMethodBind, ClassMethodTable};
pub use opaque::{Opaque, HANDLE_WORDS};
pub use string_cache::StringCache;
pub use toolbox::{c_str, ptr_then};
pub use types::*;
