/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

/// Failed registration or lookup in the class registry.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ClassRegistryError {
    /// Registration outside of an init level callback, after the registry has been frozen.
    Frozen { class_name: String },

    /// A class was registered twice with different wrapper constructors.
    Duplicate { class_name: String },

    /// Neither the class nor any of its ancestors is registered.
    UnknownClass { class_name: String },

    /// The class database does not know the class, or marks it as not instantiable.
    NotInstantiable { class_name: String },

    /// The engine returned null when asked to construct the class.
    ConstructionFailed { class_name: String },

    /// A virtual method that the class (or its engine base) does not declare, or an ID that does not belong to its table.
    UnknownVirtual { class_name: String, method_name: String },

    /// The same virtual method was given two implementations.
    DuplicateVirtual { class_name: String, method_name: String },
}

impl Error for ClassRegistryError {}

impl fmt::Display for ClassRegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen { class_name } => {
                write!(f, "cannot register class `{class_name}`: classes can only be registered during level init")
            }
            Self::Duplicate { class_name } => {
                write!(f, "Class `{class_name}` defined multiple times with different constructors")
            }
            Self::UnknownClass { class_name } => {
                write!(f, "no wrapper registered for class `{class_name}` or any of its base classes")
            }
            Self::NotInstantiable { class_name } => {
                write!(f, "class `{class_name}` cannot be instantiated")
            }
            Self::ConstructionFailed { class_name } => {
                write!(f, "engine failed to construct an instance of `{class_name}`")
            }
            Self::UnknownVirtual { class_name, method_name } => {
                write!(f, "class `{class_name}` has no virtual method `{method_name}`")
            }
            Self::DuplicateVirtual { class_name, method_name } => {
                write!(f, "virtual method `{class_name}::{method_name}` overridden more than once")
            }
        }
    }
}
