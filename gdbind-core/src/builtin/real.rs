/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#[cfg(not(feature = "double-precision"))]
mod single {
    /// Floating-point type used throughout the engine. This is the equivalent of `real_t` in the engine's C++ code.
    ///
    /// `f32` unless the `double-precision` feature is enabled, matching an engine compiled with `precision=double`.
    #[allow(non_camel_case_types)]
    pub type real = f32;

    pub(crate) type RVec2 = glam::f32::Vec2;
    pub(crate) type RVec3 = glam::f32::Vec3;
}

#[cfg(feature = "double-precision")]
mod double {
    /// Floating-point type used throughout the engine. This is the equivalent of `real_t` in the engine's C++ code.
    ///
    /// `f64` because the `double-precision` feature is enabled, matching an engine compiled with `precision=double`.
    #[allow(non_camel_case_types)]
    pub type real = f64;

    pub(crate) type RVec2 = glam::f64::DVec2;
    pub(crate) type RVec3 = glam::f64::DVec3;
}

#[cfg(feature = "double-precision")]
pub use double::*;
#[cfg(not(feature = "double-precision"))]
pub use single::*;
