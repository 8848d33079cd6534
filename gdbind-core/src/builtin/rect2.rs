/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::real_inner::real;
use crate::builtin::Vector2;

/// 2D axis-aligned bounding box.
///
/// `Rect2` consists of a position and a size. In double precision, it is the largest plain value passed through a call frame.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Vector2,
}

impl Rect2 {
    /// Create a new `Rect2` from a position and a size.
    ///
    /// _Godot equivalent: `Rect2(Vector2 position, Vector2 size)`_
    pub const fn new(position: Vector2, size: Vector2) -> Self {
        Self { position, size }
    }

    /// Create a new `Rect2` from four reals representing position `(x,y)` and size `(width,height)`.
    pub const fn from_components(x: real, y: real, width: real, height: real) -> Self {
        Self::new(Vector2::new(x, y), Vector2::new(width, height))
    }

    pub fn end(&self) -> Vector2 {
        Vector2::new(self.position.x + self.size.x, self.position.y + self.size.y)
    }

    pub fn area(&self) -> real {
        self.size.x * self.size.y
    }

    /// Whether `point` lies inside, including the top-left edges but excluding the bottom-right ones.
    pub fn contains_point(&self, point: Vector2) -> bool {
        let end = self.end();

        point.x >= self.position.x && point.y >= self.position.y && point.x < end.x && point.y < end.y
    }
}

impl fmt::Display for Rect2 {
    /// Formats `Rect2` to match Godot's string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[P: {}, S: {}]", self.position, self.size)
    }
}

impl_frame_value!(Rect2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry() {
        let rect = Rect2::from_components(1.0, 2.0, 3.0, 4.0);

        assert_eq!(rect.end(), Vector2::new(4.0, 6.0));
        assert_eq!(rect.area(), 12.0);
        assert!(rect.contains_point(Vector2::new(1.0, 2.0)));
        assert!(!rect.contains_point(Vector2::new(4.0, 3.0)));
        assert_eq!(rect.to_string(), "[P: (1, 2), S: (3, 4)]");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let rect = Rect2::default();
        let expected_json = "{\"position\":{\"x\":0.0,\"y\":0.0},\"size\":{\"x\":0.0,\"y\":0.0}}";

        crate::builtin::test_utils::roundtrip(&rect, expected_json);
    }
}
