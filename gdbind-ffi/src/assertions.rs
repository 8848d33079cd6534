/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Assertion macros for compile-time and runtime checks with different safeguard levels.
//!
//! The cfgs `safeguards_strict` and `safeguards_balanced` are set per crate by `gdbind_bindings::emit_safeguard_levels()`, so
//! each crate expanding these macros needs that call in its build script.

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Compile-time assertions

/// Verifies a condition at compile time.
#[macro_export]
macro_rules! static_assert {
    ($cond:expr) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:literal) => {
        const _: () = assert!($cond, $msg);
    };
}

/// Verifies at compile time that a type fits into a call-frame slot of `HANDLE_WORDS` 64-bit words.
#[macro_export]
macro_rules! static_assert_fits_slot {
    ($T:ty) => {
        $crate::static_assert!(
            std::mem::size_of::<$T>() <= $crate::HANDLE_WORDS * 8 && std::mem::align_of::<$T>() <= 8,
            "type does not fit into a call frame slot"
        );
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Runtime assertions - strict mode

/// `assert!` under `safeguards_strict` (default in debug builds), no-op otherwise.
#[macro_export]
macro_rules! strict_assert {
    ($($arg:tt)*) => {
        #[cfg(safeguards_strict)]
        assert!($($arg)*);
    };
}

/// `assert_eq!` under `safeguards_strict`, no-op otherwise.
#[macro_export]
macro_rules! strict_assert_eq {
    ($actual:expr, $expected:expr) => {
        #[cfg(safeguards_strict)]
        assert_eq!($actual, $expected);
    };
    ($actual:expr, $expected:expr, $($arg:tt)*) => {
        #[cfg(safeguards_strict)]
        assert_eq!($actual, $expected, $($arg)*);
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Runtime assertions - balanced mode

/// `assert!` under `safeguards_balanced` (default in debug and release builds), no-op otherwise.
#[macro_export]
macro_rules! balanced_assert {
    ($($arg:tt)*) => {
        #[cfg(safeguards_balanced)]
        assert!($($arg)*);
    };
}

/// `assert_eq!` under `safeguards_balanced`, no-op otherwise.
#[macro_export]
macro_rules! balanced_assert_eq {
    ($actual:expr, $expected:expr) => {
        #[cfg(safeguards_balanced)]
        assert_eq!($actual, $expected);
    };
    ($actual:expr, $expected:expr, $($arg:tt)*) => {
        #[cfg(safeguards_balanced)]
        assert_eq!($actual, $expected, $($arg)*);
    };
}
