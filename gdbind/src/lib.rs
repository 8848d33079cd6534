/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Marshaling layer for GDExtension bindings
//!
//! This crate is what generated per-class binding code builds on when it calls into the engine through the GDExtension C API.
//! It does not contain the generated classes themselves, only the parts they have in common:
//!
//! * **Lifetimes**: every engine value that Rust must free belongs to a [`Scope`][lifetime::Scope]. Ending the scope frees all
//!   its members exactly once; using a member afterwards panics with a diagnostic instead of touching freed memory.
//! * **Call frames**: a [`Frame`][meta::Frame] lays out arguments and the return slot the way `object_method_bind_ptrcall`
//!   expects them, and returns borrowed arguments when it is dropped.
//! * **Method binds**: [`CachedMethodBind`][sys::CachedMethodBind] resolves a `(class, method, hash)` triple once, from the
//!   method table of its init level.
//! * **Ownership transfer**: returns are either borrowed from the engine or transferred to Rust and registered in a scope;
//!   arguments can hand an owned object over to the engine.
//!
//! ## Cargo features
//!
//! * **`double-precision`**: `real` is `f64`. Must match the engine build.
//! * **`serde`**: `Serialize`/`Deserialize` for the plain builtin types (vectors, `Rect2`, `Color`).
//! * **`debug-checks-*` / `release-checks-*`**: safeguard levels. `paranoid` validates instance IDs and argument counts on
//!   every call, `balanced` keeps cheap checks, `fast-unsafe` skips them.

#![doc(html_logo_url = "https://raw.githubusercontent.com/godot-rust/assets/master/gdext/banner.svg")]

#[doc(inline)]
pub use gdbind_core::{builtin, classes, init, lifetime, log, meta, obj, registry};

#[doc(hidden)]
pub use gdbind_core::{private, sys};

pub use gdbind_core::{entry_point, godot_error, godot_print, godot_warn, impl_inherits};

pub mod prelude;
