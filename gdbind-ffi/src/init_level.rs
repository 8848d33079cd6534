/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;

/// Step in the engine initialization process.
///
/// Initialization and deinitialization are split into multiple levels, like a stack. At each level, a different set of classes
/// becomes available, and with it a different method table. Deinitialization happens in reverse order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum InitLevel {
    /// First level. Builtin types are available, only core classes are.
    Core,

    /// Second level. Server classes become available.
    Servers,

    /// Third level. Most classes are available.
    Scene,

    /// Fourth level, only in the editor. All classes are available.
    Editor,
}

impl InitLevel {
    pub const ALL: [InitLevel; 4] = [Self::Core, Self::Servers, Self::Scene, Self::Editor];

    #[doc(hidden)]
    pub fn from_sys(level: sys::GDExtensionInitializationLevel) -> Self {
        match level {
            sys::GDEXTENSION_INITIALIZATION_CORE => Self::Core,
            sys::GDEXTENSION_INITIALIZATION_SERVERS => Self::Servers,
            sys::GDEXTENSION_INITIALIZATION_SCENE => Self::Scene,
            sys::GDEXTENSION_INITIALIZATION_EDITOR => Self::Editor,
            _ => {
                eprintln!("WARNING: unknown initialization level {level}");
                Self::Scene
            }
        }
    }

    #[doc(hidden)]
    pub fn to_sys(self) -> sys::GDExtensionInitializationLevel {
        match self {
            Self::Core => sys::GDEXTENSION_INITIALIZATION_CORE,
            Self::Servers => sys::GDEXTENSION_INITIALIZATION_SERVERS,
            Self::Scene => sys::GDEXTENSION_INITIALIZATION_SCENE,
            Self::Editor => sys::GDEXTENSION_INITIALIZATION_EDITOR,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sys_roundtrip() {
        for level in InitLevel::ALL {
            assert_eq!(InitLevel::from_sys(level.to_sys()), level);
        }
    }

    #[test]
    fn unknown_level_falls_back_to_scene() {
        assert_eq!(InitLevel::from_sys(17), InitLevel::Scene);
    }
}
