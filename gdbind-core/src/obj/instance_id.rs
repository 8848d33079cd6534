/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::num::NonZeroU64;

/// Represents a non-zero instance ID.
///
/// The engine hands out instance IDs as `u64`, scripts see them as `i64`. You can usually treat this as an opaque value.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct InstanceId {
    // Note: in the public API, signed i64 is the canonical representation.
    value: NonZeroU64,
}

impl InstanceId {
    /// Constructs an instance ID from an integer, or `None` if the integer is zero.
    ///
    /// This does *not* check if the instance is valid.
    pub fn try_from_i64(id: i64) -> Option<Self> {
        Self::try_from_u64(id as u64)
    }

    /// Constructs an instance ID from a non-zero integer, or panics.
    ///
    /// # Panics
    /// If `id` is zero.
    pub fn from_nonzero(id: i64) -> Self {
        Self::try_from_i64(id).expect("expected non-zero instance ID")
    }

    pub fn try_from_u64(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(|value| Self { value })
    }

    pub fn to_i64(self) -> i64 {
        self.to_u64() as i64
    }

    pub fn to_u64(self) -> u64 {
        self.value.get()
    }

    /// Returns if the object being referred to inherits `RefCounted`.
    ///
    /// No engine round-trip: the engine encodes this in the highest bit of the ID.
    pub fn is_ref_counted(self) -> bool {
        self.to_u64() & (1u64 << 63) != 0
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_i64())
    }
}

impl Debug for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "InstanceId({})", self.to_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(InstanceId::try_from_i64(0), None);
        assert_eq!(InstanceId::try_from_u64(0), None);
    }

    #[test]
    fn ref_counted_bit() {
        let plain = InstanceId::from_nonzero(42);
        let counted = InstanceId::try_from_u64(42 | (1 << 63)).unwrap();

        assert!(!plain.is_ref_counted());
        assert!(counted.is_ref_counted());
        assert!(counted.to_i64() < 0);
    }
}
