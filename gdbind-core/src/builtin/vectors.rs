/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::real_inner::{real, RVec2, RVec3};

/// Vector used for 2D math using floating point coordinates.
///
/// It uses floating-point coordinates of 32-bit precision, unlike the engine's `float` type which is always 64-bit. The engine can
/// be compiled with the option `precision=double` to use 64-bit vectors; use the `double-precision` feature in that case.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector2 {
    pub x: real,
    pub y: real,
}

impl Vector2 {
    /// Vector with all components set to `0.0`.
    pub const ZERO: Self = Self::splat(0.0);

    /// Vector with all components set to `1.0`.
    pub const ONE: Self = Self::splat(1.0);

    pub const fn new(x: real, y: real) -> Self {
        Self { x, y }
    }

    /// Constructs a new `Vector2` with both components set to `v`.
    pub const fn splat(v: real) -> Self {
        Self::new(v, v)
    }

    /// Converts the corresponding `glam` type to `Self`.
    pub fn from_glam(v: RVec2) -> Self {
        Self::new(v.x, v.y)
    }

    /// Converts `self` to the corresponding `glam` type.
    pub fn to_glam(self) -> RVec2 {
        RVec2::new(self.x, self.y)
    }

    pub fn length(self) -> real {
        self.to_glam().length()
    }
}

impl fmt::Display for Vector2 {
    /// Formats the vector like Godot: `(x, y)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Vector used for 3D math using floating point coordinates.
///
/// See [`Vector2`] for precision notes.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector3 {
    pub x: real,
    pub y: real,
    pub z: real,
}

impl Vector3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);

    pub const fn new(x: real, y: real, z: real) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: real) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_glam(v: RVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn to_glam(self) -> RVec3 {
        RVec3::new(self.x, self.y, self.z)
    }

    pub fn length(self) -> real {
        self.to_glam().length()
    }

    pub fn cross(self, with: Self) -> Self {
        Self::from_glam(self.to_glam().cross(with.to_glam()))
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl_frame_value!(Vector2, Vector3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glam_conversions() {
        let v = Vector2::new(3.0, 4.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(Vector2::from_glam(v.to_glam()), v);

        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn display() {
        assert_eq!(Vector2::new(1.5, -2.0).to_string(), "(1.5, -2)");
        assert_eq!(Vector3::ONE.to_string(), "(1, 1, 1)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let vector = Vector2::default();
        let expected_json = "{\"x\":0.0,\"y\":0.0}";

        crate::builtin::test_utils::roundtrip(&vector, expected_json);
    }
}
