/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt;

use gdbind_ffi as sys;

use crate::meta::error::ClassRegistryError;

/// Ptrcall-shaped implementation of a virtual method, as the engine invokes it.
pub type VirtualFn = unsafe extern "C" fn(
    instance: sys::GDExtensionClassInstancePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
);

/// Position of a virtual method in its class's [`VirtualTable`].
///
/// Resolved from the method name once, at registration; calls then index the table directly.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct VirtualMethodId(u32);

impl VirtualMethodId {
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Overridden virtual methods of one extension class.
pub struct VirtualTable {
    class_name: String,
    entries: Vec<(String, VirtualFn)>,
    ids_by_name: HashMap<String, VirtualMethodId>,
}

impl VirtualTable {
    /// Starts a table for `class_name`, whose engine base class is `base_class`.
    pub fn builder(class_name: impl Into<String>, base_class: impl Into<String>) -> VirtualTableBuilder {
        VirtualTableBuilder {
            class_name: class_name.into(),
            base_class: base_class.into(),
            entries: Vec::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn id_of(&self, method_name: &str) -> Option<VirtualMethodId> {
        self.ids_by_name.get(method_name).copied()
    }

    /// Name lookup used by the engine's `get_virtual` callback. `None` means "not overridden".
    pub fn get_virtual(&self, method_name: &str) -> sys::GDExtensionClassCallVirtual {
        let id = self.id_of(method_name)?;
        self.get(id)
    }

    pub fn get(&self, id: VirtualMethodId) -> Option<VirtualFn> {
        self.entries.get(id.0 as usize).map(|&(_, func)| func)
    }

    /// Invokes the method with ID `id`.
    ///
    /// # Safety
    /// `instance`, `args` and `ret` must match what the virtual method expects: an instance of this class, one pointer per
    /// parameter, and a return slot of the return type.
    pub unsafe fn call(
        &self,
        id: VirtualMethodId,
        instance: sys::GDExtensionClassInstancePtr,
        args: *const sys::GDExtensionConstTypePtr,
        ret: sys::GDExtensionTypePtr,
    ) -> Result<(), ClassRegistryError> {
        let Some(func) = self.get(id) else {
            return Err(ClassRegistryError::UnknownVirtual {
                class_name: self.class_name.clone(),
                method_name: format!("#{}", id.0),
            });
        };

        func(instance, args, ret);
        Ok(())
    }

    /// Whether both tables override the same methods with the same functions.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((name_a, fn_a), (name_b, fn_b))| name_a == name_b && std::ptr::fn_addr_eq(*fn_a, *fn_b))
    }
}

impl fmt::Debug for VirtualTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|(name, _)| name.as_str()).collect();

        f.debug_struct("VirtualTable")
            .field("class_name", &self.class_name)
            .field("methods", &names)
            .finish()
    }
}

/// Collects overrides, then resolves them into a [`VirtualTable`].
pub struct VirtualTableBuilder {
    class_name: String,
    base_class: String,
    entries: Vec<(String, VirtualFn)>,
}

impl VirtualTableBuilder {
    pub fn method(mut self, name: impl Into<String>, func: VirtualFn) -> Self {
        self.entries.push((name.into(), func));
        self
    }

    /// Assigns IDs in insertion order.
    ///
    /// Once the binding is initialized, each name is checked against the virtual methods that the base class declares in the
    /// class database.
    pub fn build(self) -> Result<VirtualTable, ClassRegistryError> {
        let class_db = if sys::is_initialized() {
            // SAFETY: checked above.
            Some(unsafe { sys::class_db() })
        } else {
            None
        };

        let mut ids_by_name = HashMap::with_capacity(self.entries.len());
        for (index, (name, _)) in self.entries.iter().enumerate() {
            if let Some(db) = class_db {
                if !db.has_virtual(&self.base_class, name) {
                    return Err(ClassRegistryError::UnknownVirtual {
                        class_name: self.class_name,
                        method_name: name.clone(),
                    });
                }
            }

            let id = VirtualMethodId(index as u32);
            if ids_by_name.insert(name.clone(), id).is_some() {
                return Err(ClassRegistryError::DuplicateVirtual {
                    class_name: self.class_name,
                    method_name: name.clone(),
                });
            }
        }

        Ok(VirtualTable {
            class_name: self.class_name,
            entries: self.entries,
            ids_by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    thread_local! {
        static CALLS: Cell<u32> = const { Cell::new(0) };
    }

    unsafe extern "C" fn ready(
        _instance: sys::GDExtensionClassInstancePtr,
        _args: *const sys::GDExtensionConstTypePtr,
        _ret: sys::GDExtensionTypePtr,
    ) {
        CALLS.set(CALLS.get() + 1);
    }

    unsafe extern "C" fn process(
        _instance: sys::GDExtensionClassInstancePtr,
        _args: *const sys::GDExtensionConstTypePtr,
        ret: sys::GDExtensionTypePtr,
    ) {
        *(ret as *mut i64) = 7;
    }

    #[test]
    fn ids_follow_insertion_order() {
        let table = VirtualTable::builder("Player", "Node")
            .method("_ready", ready)
            .method("_process", process)
            .build()
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.id_of("_ready").map(VirtualMethodId::to_u32), Some(0));
        assert_eq!(table.id_of("_process").map(VirtualMethodId::to_u32), Some(1));
        assert!(table.id_of("_input").is_none());
        assert!(table.get_virtual("_input").is_none());
    }

    #[test]
    fn call_by_id() {
        let table = VirtualTable::builder("Player", "Node")
            .method("_ready", ready)
            .method("_process", process)
            .build()
            .unwrap();

        let before = CALLS.get();
        let ready_id = table.id_of("_ready").unwrap();
        unsafe { table.call(ready_id, std::ptr::null_mut(), std::ptr::null(), std::ptr::null_mut()) }.unwrap();
        assert_eq!(CALLS.get(), before + 1);

        let mut ret = 0i64;
        let process_id = table.id_of("_process").unwrap();
        unsafe {
            table.call(
                process_id,
                std::ptr::null_mut(),
                std::ptr::null(),
                &mut ret as *mut i64 as sys::GDExtensionTypePtr,
            )
        }
        .unwrap();
        assert_eq!(ret, 7);
    }

    #[test]
    fn foreign_id_is_rejected() {
        let small = VirtualTable::builder("A", "Node").method("_ready", ready).build().unwrap();
        let large = VirtualTable::builder("B", "Node")
            .method("_ready", ready)
            .method("_process", process)
            .build()
            .unwrap();

        let foreign = large.id_of("_process").unwrap();
        let err = unsafe { small.call(foreign, std::ptr::null_mut(), std::ptr::null(), std::ptr::null_mut()) }
            .unwrap_err();

        assert!(matches!(err, ClassRegistryError::UnknownVirtual { .. }));
    }

    #[test]
    fn duplicate_override() {
        let err = VirtualTable::builder("Player", "Node")
            .method("_ready", ready)
            .method("_ready", process)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            ClassRegistryError::DuplicateVirtual {
                class_name: "Player".to_string(),
                method_name: "_ready".to_string(),
            }
        );
    }

    #[test]
    fn same_overrides_compare_equal() {
        let a = VirtualTable::builder("P", "Node").method("_ready", ready).build().unwrap();
        let b = VirtualTable::builder("P", "Node").method("_ready", ready).build().unwrap();
        let c = VirtualTable::builder("P", "Node").method("_ready", process).build().unwrap();

        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }
}
