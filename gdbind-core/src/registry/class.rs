/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::Any;
use std::collections::HashMap;

use gdbind_ffi as sys;
use sys::{out, Global, InitLevel};

use crate::classes::{Object, ObjectApi};
use crate::lifetime::Scope;
use crate::meta::error::ClassRegistryError;
use crate::meta::ClassId;
use crate::obj::{Gd, GodotClass, ObjectHandle};
use crate::registry::virtuals::{VirtualFn, VirtualMethodId, VirtualTable};

// Written during init level callbacks only, then frozen. Lookups afterwards take the read lock.
static CLASS_REGISTRY: Global<ClassRegistry> = Global::default();

/// Wraps an object of a registered class into its Rust-side representation.
///
/// The thunk receives the object typed as `Object` and returns whatever the registering code uses for that class, typically a
/// downcast `Gd<T>`.
pub type ConstructThunk = fn(Gd<Object>) -> Box<dyn Any>;

/// Default thunk: downcasts to `Gd<T>`.
fn wrap_as_gd<T: GodotClass>(object: Gd<Object>) -> Box<dyn Any> {
    Box::new(object.cast::<T>())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Registration record of one class.
#[derive(Debug)]
pub struct ClassRecord {
    class_name: String,
    construct: ConstructThunk,
    virtuals: Option<VirtualTable>,
}

impl ClassRecord {
    pub fn new(class_name: impl Into<String>, construct: ConstructThunk) -> Self {
        Self {
            class_name: class_name.into(),
            construct,
            virtuals: None,
        }
    }

    /// Record for `T`, wrapping objects as `Gd<T>`.
    pub fn of<T: GodotClass>() -> Self {
        Self::new(T::CLASS_NAME, wrap_as_gd::<T>)
    }

    pub fn with_virtuals(mut self, virtuals: VirtualTable) -> Self {
        self.virtuals = Some(virtuals);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn construct_thunk(&self) -> ConstructThunk {
        self.construct
    }

    pub fn virtuals(&self) -> Option<&VirtualTable> {
        self.virtuals.as_ref()
    }

    fn same_as(&self, other: &Self) -> bool {
        let same_virtuals = match (&self.virtuals, &other.virtuals) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_as(b),
            _ => false,
        };

        self.class_name == other.class_name && std::ptr::fn_addr_eq(self.construct, other.construct) && same_virtuals
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Class name → registration record, together with the init level each record was registered at.
#[derive(Default, Debug)]
pub struct ClassRegistry {
    records: HashMap<String, (ClassRecord, InitLevel)>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    ///
    /// Registering an identical record again is a no-op. A different record under an existing name fails.
    pub fn insert(&mut self, record: ClassRecord, level: InitLevel) -> Result<(), ClassRegistryError> {
        if let Some((existing, _)) = self.records.get(&record.class_name) {
            return if existing.same_as(&record) {
                out!("class `{}` registered again with identical record", record.class_name);
                Ok(())
            } else {
                Err(ClassRegistryError::Duplicate {
                    class_name: record.class_name,
                })
            };
        }

        self.records.insert(record.class_name.clone(), (record, level));
        Ok(())
    }

    pub fn get(&self, class_name: &str) -> Option<&ClassRecord> {
        self.records.get(class_name).map(|(record, _)| record)
    }

    /// First registered record along `ancestry`, which starts at the most derived class.
    pub fn resolve<'a>(&self, ancestry: impl IntoIterator<Item = &'a str>) -> Option<&ClassRecord> {
        ancestry.into_iter().find_map(|name| self.get(name))
    }

    /// Removes all records registered at `level`. Returns how many were removed.
    pub fn remove_level(&mut self, level: InitLevel) -> usize {
        let before = self.records.len();
        self.records.retain(|_, (_, record_level)| *record_level != level);

        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Registration (init level callbacks)

/// Handed to [`ExtensionLibrary::register_classes`][crate::init::ExtensionLibrary::register_classes] for one init level.
pub struct ClassRegistrar {
    level: InitLevel,
}

impl ClassRegistrar {
    pub(crate) fn new(level: InitLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> InitLevel {
        self.level
    }

    /// Registers `T`, wrapping its objects as `Gd<T>`.
    ///
    /// # Panics
    /// If `T`'s name is already registered with a different record.
    #[track_caller]
    pub fn register<T: GodotClass>(&mut self) {
        self.register_record(ClassRecord::of::<T>());
    }

    #[track_caller]
    pub fn register_record(&mut self, record: ClassRecord) {
        if let Err(e) = self.try_register_record(record) {
            panic!("{e}");
        }
    }

    pub fn try_register_record(&mut self, record: ClassRecord) -> Result<(), ClassRegistryError> {
        out!("register class `{}` at level {:?}", record.class_name, self.level);
        register_class(record, self.level)
    }
}

/// Adds a record to the global registry.
///
/// Fails with [`ClassRegistryError::Frozen`] outside of init level callbacks.
pub fn register_class(record: ClassRecord, level: InitLevel) -> Result<(), ClassRegistryError> {
    if CLASS_REGISTRY.is_frozen() {
        return Err(ClassRegistryError::Frozen {
            class_name: record.class_name,
        });
    }

    CLASS_REGISTRY.lock().insert(record, level)
}

pub(crate) fn unregister_level(level: InitLevel) -> usize {
    CLASS_REGISTRY.lock().remove_level(level)
}

pub(crate) fn freeze() {
    CLASS_REGISTRY.freeze();
}

pub(crate) fn unfreeze() {
    CLASS_REGISTRY.unfreeze();
}

pub fn is_frozen() -> bool {
    CLASS_REGISTRY.is_frozen()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lookup

pub fn is_registered(class_name: &str) -> bool {
    CLASS_REGISTRY.read().get(class_name).is_some()
}

pub fn registered_count() -> usize {
    CLASS_REGISTRY.read().len()
}

/// Constructs an object of class `class_name`, owned by `scope`, and wraps it with the class's registered thunk.
pub fn construct_by_name(class_name: &str, scope: Scope) -> Result<Box<dyn Any>, ClassRegistryError> {
    let thunk = CLASS_REGISTRY
        .read()
        .get(class_name)
        .map(ClassRecord::construct_thunk)
        .ok_or_else(|| ClassRegistryError::UnknownClass {
            class_name: class_name.to_string(),
        })?;

    // SAFETY: objects can only be constructed once the binding is initialized.
    let instantiable = unsafe { sys::class_db() }
        .class(class_name)
        .is_some_and(|info| info.is_instantiable);

    if !instantiable {
        return Err(ClassRegistryError::NotInstantiable {
            class_name: class_name.to_string(),
        });
    }

    let class_id = ClassId::new_dynamic(class_name.to_string());

    // SAFETY: valid class name; the engine returns an object with one reference if it is reference-counted.
    let ptr = unsafe { sys::interface_fn!(classdb_construct_object)(class_id.string_sys()) };
    if ptr.is_null() {
        return Err(ClassRegistryError::ConstructionFailed {
            class_name: class_name.to_string(),
        });
    }

    // SAFETY: freshly constructed, live object that nobody else owns.
    let object = unsafe { Gd::<Object>::from_owned(ObjectHandle::from_sys(ptr, class_id), scope) };

    Ok(thunk(object))
}

/// Wraps `object` according to its dynamic class: the record of the class itself, or else of its nearest registered ancestor.
pub fn wrap_dynamic(object: Gd<Object>) -> Result<Box<dyn Any>, ClassRegistryError> {
    let dynamic_class = object.get_class();

    // SAFETY: object pointers only exist once the binding is initialized.
    let class_db = unsafe { sys::class_db() };
    let ancestry = class_db.ancestry(&dynamic_class);

    // Extension classes are not in the class database; try the name itself first.
    let candidates = std::iter::once(dynamic_class.as_str()).chain(ancestry);
    let thunk = CLASS_REGISTRY
        .read()
        .resolve(candidates)
        .map(ClassRecord::construct_thunk)
        .ok_or_else(|| ClassRegistryError::UnknownClass {
            class_name: dynamic_class.clone(),
        })?;

    Ok(thunk(object))
}

/// Like [`wrap_dynamic()`], then downcasts to `W`. `None` if the registered thunk produced something else.
pub fn wrap_dynamic_as<W: 'static>(object: Gd<Object>) -> Result<Option<W>, ClassRegistryError> {
    let wrapped = wrap_dynamic(object)?;
    Ok(wrapped.downcast::<W>().ok().map(|boxed| *boxed))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Virtual methods

/// Resolves a virtual method of a registered class to its ID.
pub fn virtual_method_id(class_name: &str, method_name: &str) -> Result<VirtualMethodId, ClassRegistryError> {
    CLASS_REGISTRY
        .read()
        .get(class_name)
        .and_then(ClassRecord::virtuals)
        .and_then(|table| table.id_of(method_name))
        .ok_or_else(|| ClassRegistryError::UnknownVirtual {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
        })
}

/// Implementation of a virtual method, looked up by name; this is what the engine's `get_virtual` callback returns.
pub fn get_virtual(class_name: &str, method_name: &str) -> sys::GDExtensionClassCallVirtual {
    CLASS_REGISTRY
        .read()
        .get(class_name)
        .and_then(ClassRecord::virtuals)
        .and_then(|table| table.get_virtual(method_name))
}

/// Invokes a virtual method by ID.
///
/// # Safety
/// See [`VirtualTable::call()`].
pub unsafe fn call_virtual(
    class_name: &str,
    id: VirtualMethodId,
    instance: sys::GDExtensionClassInstancePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
) -> Result<(), ClassRegistryError> {
    // Copy the function out, so the method may itself query the registry.
    let func: Option<VirtualFn> = CLASS_REGISTRY
        .read()
        .get(class_name)
        .and_then(ClassRecord::virtuals)
        .and_then(|table| table.get(id));

    let Some(func) = func else {
        return Err(ClassRegistryError::UnknownVirtual {
            class_name: class_name.to_string(),
            method_name: format!("#{}", id.to_u32()),
        });
    };

    func(instance, args, ret);
    Ok(())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::RefCounted;

    fn other_thunk(object: Gd<Object>) -> Box<dyn Any> {
        Box::new(object)
    }

    #[test]
    fn identical_registration_is_idempotent() {
        let mut registry = ClassRegistry::new();

        registry.insert(ClassRecord::of::<RefCounted>(), InitLevel::Core).unwrap();
        registry.insert(ClassRecord::of::<RefCounted>(), InitLevel::Core).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_thunk_is_duplicate() {
        let mut registry = ClassRegistry::new();
        registry.insert(ClassRecord::of::<RefCounted>(), InitLevel::Core).unwrap();

        let err = registry
            .insert(ClassRecord::new("RefCounted", other_thunk), InitLevel::Core)
            .unwrap_err();

        assert_eq!(
            err,
            ClassRegistryError::Duplicate {
                class_name: "RefCounted".to_string()
            }
        );
        assert!(std::ptr::fn_addr_eq(
            registry.get("RefCounted").unwrap().construct_thunk(),
            wrap_as_gd::<RefCounted> as ConstructThunk
        ));
    }

    #[test]
    fn resolve_walks_ancestry() {
        let mut registry = ClassRegistry::new();
        registry.insert(ClassRecord::of::<Object>(), InitLevel::Core).unwrap();
        registry.insert(ClassRecord::new("Node", other_thunk), InitLevel::Scene).unwrap();

        let found = registry.resolve(["Label", "Control", "CanvasItem", "Node", "Object"]);
        assert_eq!(found.map(ClassRecord::class_name), Some("Node"));

        assert!(registry.resolve(["Unknown"]).is_none());
    }

    #[test]
    fn remove_by_level() {
        let mut registry = ClassRegistry::new();
        registry.insert(ClassRecord::of::<Object>(), InitLevel::Core).unwrap();
        registry.insert(ClassRecord::new("Node", other_thunk), InitLevel::Scene).unwrap();

        assert_eq!(registry.remove_level(InitLevel::Scene), 1);
        assert!(registry.get("Node").is_none());
        assert!(registry.get("Object").is_some());
    }
}
