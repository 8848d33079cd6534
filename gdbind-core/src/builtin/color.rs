/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// Color built-in type, in floating-point RGBA format.
///
/// Channel values are _typically_ in the range of 0 to 1, but this is not a requirement, and values outside this range are
/// explicitly allowed for e.g. High Dynamic Range (HDR). Always `f32`, also in double-precision builds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT_BLACK: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);

    /// Constructs a new `Color` with the given components, fully opaque.
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs a new `Color` from 8-bit channels, mapping 0..=255 to 0.0..=1.0.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(from_u8(r), from_u8(g), from_u8(b), from_u8(a))
    }

    /// Returns the channels as 8-bit integers, clamped and rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    /// Transparent black, like the engine's default constructor.
    fn default() -> Self {
        Self::TRANSPARENT_BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

fn from_u8(v: u8) -> f32 {
    v as f32 / 255.0
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl_frame_value!(Color);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_roundtrip() {
        let color = Color::from_rgba8(255, 128, 0, 64);
        assert_eq!(color.to_rgba8(), [255, 128, 0, 64]);
        assert_eq!(Color::from_rgb(2.0, -1.0, 0.5).to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn default_is_transparent() {
        assert_eq!(Color::default().a, 0.0);
        assert_eq!(Color::WHITE.with_alpha(0.5).a, 0.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let color = Color::WHITE;
        let expected_json = "{\"r\":1.0,\"g\":1.0,\"b\":1.0,\"a\":1.0}";

        crate::builtin::test_utils::roundtrip(&color, expected_json);
    }
}
