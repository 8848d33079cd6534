/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Helpers invoked from `build.rs` of the gdbind crates.
//!
//! Every crate that expands `strict_assert!` / `balanced_assert!` needs the safeguard cfgs set for itself, so each of them
//! calls [`emit_safeguard_levels()`] from its build script.

use std::env;

/// Safeguard level, selected through Cargo features per build profile.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum SafeguardLevel {
    /// No runtime checks beyond what Rust itself does.
    FastUnsafe,

    /// Checks that are cheap compared to the engine call they protect.
    Balanced,

    /// All checks, including per-call instance validation and frame bookkeeping asserts.
    Strict,
}

impl SafeguardLevel {
    fn from_features(prefix: &str) -> Option<Self> {
        // Highest explicitly enabled level wins, so that a dependency asking for more checks is respected.
        if has_feature(&format!("{prefix}_CHECKS_PARANOID")) {
            Some(Self::Strict)
        } else if has_feature(&format!("{prefix}_CHECKS_BALANCED")) {
            Some(Self::Balanced)
        } else if has_feature(&format!("{prefix}_CHECKS_FAST_UNSAFE")) {
            Some(Self::FastUnsafe)
        } else {
            None
        }
    }
}

/// Determines the safeguard level of the crate currently being built.
///
/// Debug builds default to [`SafeguardLevel::Strict`], release builds to [`SafeguardLevel::Balanced`].
pub fn safeguard_level() -> SafeguardLevel {
    let is_debug = env::var_os("CARGO_CFG_DEBUG_ASSERTIONS").is_some();

    if is_debug {
        SafeguardLevel::from_features("DEBUG").unwrap_or(SafeguardLevel::Strict)
    } else {
        SafeguardLevel::from_features("RELEASE").unwrap_or(SafeguardLevel::Balanced)
    }
}

/// Emits `cfg(safeguards_balanced)` and `cfg(safeguards_strict)` for the crate currently being built.
pub fn emit_safeguard_levels() {
    println!(r#"cargo:rustc-check-cfg=cfg(safeguards_balanced, safeguards_strict)"#);
    println!("cargo:rerun-if-changed=build.rs");

    let level = safeguard_level();
    if level >= SafeguardLevel::Balanced {
        println!("cargo:rustc-cfg=safeguards_balanced");
    }
    if level >= SafeguardLevel::Strict {
        println!("cargo:rustc-cfg=safeguards_strict");
    }
}

fn has_feature(name: &str) -> bool {
    env::var_os(format!("CARGO_FEATURE_{name}")).is_some()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(SafeguardLevel::FastUnsafe < SafeguardLevel::Balanced);
        assert!(SafeguardLevel::Balanced < SafeguardLevel::Strict);
    }
}
