/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-process stand-in for the engine side of the GDExtension interface.
//!
//! The mock keeps a global world of builtin values and objects, serves the interface functions through
//! [`get_proc_address()`], and answers method binds for the classes in `res/test_api.json`. Every free call made by the
//! binding is recorded in a per-thread log, so tests can count them exactly.
//!
//! Value representation:
//! - Builtins (strings, arrays, ...): the first word of the opaque value holds a world ID.
//! - Variants: word 0 holds the variant type, word 1 the world ID.
//! - Objects: pointers to leaked `ObjectCell`s, so that stale pointers can still be read.
//!
//! Nothing in here may panic: all entry points are `extern "C"`, where unwinding aborts the test process.

mod interface;
mod methods;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use gdbind::sys::{self, ClassDb, VariantType};

pub use interface::get_proc_address;

/// Class database that both the library and the mock engine are built from.
pub const TEST_API_JSON: &str = include_str!("../../../res/test_api.json");

const REFCOUNTED_BIT: u64 = 1 << 63;

static WORLD: LazyLock<Mutex<World>> = LazyLock::new(|| Mutex::new(World::new()));

thread_local! {
    static FREES: RefCell<Vec<FreeEvent>> = const { RefCell::new(Vec::new()) };
    static BAD_FREES: Cell<usize> = const { Cell::new(0) };
    static MESSAGES: RefCell<Vec<EngineMessage>> = const { RefCell::new(Vec::new()) };
}

/// Runs `f` with exclusive access to the world.
fn with_world<R>(f: impl FnOnce(&mut World) -> R) -> R {
    let mut world = WORLD.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut world)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Observations

/// One call of the binding into an engine free function.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FreeEvent {
    /// Destructor of a builtin type.
    Builtin(VariantType),

    /// `variant_destroy`.
    Variant,

    /// `object_destroy`, with the dynamic class of the destroyed object.
    Object(String),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MessageLevel {
    Error,
    Warning,
}

/// Message that the library pushed through `print_error` or `print_warning`, or that the mock reported itself.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EngineMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Counts free calls made on the current thread since [`start()`](Self::start).
pub struct FreeTracker {
    start: usize,
    bad_start: usize,
}

impl FreeTracker {
    pub fn start() -> Self {
        Self {
            start: FREES.with_borrow(Vec::len),
            bad_start: BAD_FREES.get(),
        }
    }

    /// Free calls since the tracker started, in call order.
    pub fn events(&self) -> Vec<FreeEvent> {
        FREES.with_borrow(|frees| frees[self.start..].to_vec())
    }

    pub fn count(&self) -> usize {
        FREES.with_borrow(Vec::len) - self.start
    }

    /// Free calls since the tracker started that destroyed an object of class `class_name`.
    pub fn objects_freed(&self, class_name: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, FreeEvent::Object(class) if class == class_name))
            .count()
    }

    /// Free calls on values that were unknown or already freed.
    pub fn bad_frees(&self) -> usize {
        BAD_FREES.get() - self.bad_start
    }
}

/// Takes the messages printed on the current thread so far.
pub fn take_messages() -> Vec<EngineMessage> {
    MESSAGES.take()
}

fn record_free(event: FreeEvent) {
    FREES.with_borrow_mut(|frees| frees.push(event));
}

fn record_bad_free(what: &str) {
    BAD_FREES.set(BAD_FREES.get() + 1);
    record_message(MessageLevel::Error, format!("mock engine: bad free of {what}"));
}

fn record_message(level: MessageLevel, text: String) {
    MESSAGES.with_borrow_mut(|messages| messages.push(EngineMessage { level, text }));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Test-side access to the world

/// Whether a builtin value with this world ID has not been freed.
pub fn is_value_alive(id: u64) -> bool {
    with_world(|w| w.builtins.contains_key(&id))
}

/// Whether the engine still has an object with this instance ID.
pub fn is_object_alive(instance_id: u64) -> bool {
    with_world(|w| w.objects.contains_key(&instance_id))
}

/// Contents of a string or string name, by world ID.
pub fn text_of(id: u64) -> Option<String> {
    with_world(|w| match &w.builtins.get(&id)?.value {
        Value::Text(text) => Some(text.clone()),
        _ => None,
    })
}

/// Type and integer payload of a live variant, by world ID.
pub fn variant_of(id: u64) -> Option<(VariantType, i64)> {
    with_world(|w| match w.builtins.get(&id)?.value {
        Value::Variant(ty, payload) => Some((ty, payload)),
        _ => None,
    })
}

/// Instance IDs stored in an array, by world ID.
pub fn array_items(id: u64) -> Option<Vec<u64>> {
    with_world(|w| match &w.builtins.get(&id)?.value {
        Value::Objects(items) => Some(items.clone()),
        _ => None,
    })
}

/// Reference count of a live reference-counted object.
pub fn reference_count(instance_id: u64) -> Option<i64> {
    with_world(|w| w.objects.get(&instance_id).map(|o| o.refcount))
}

/// Creates an object that the engine owns, like a node loaded as part of a scene. Returns its instance ID.
pub fn spawn_engine_object(class_name: &str, name: &str) -> u64 {
    let spawned = with_world(|w| {
        let instance_id = w.construct(class_name)?;
        if let Some(object) = w.objects.get_mut(&instance_id) {
            object.name = name.to_string();
        }

        Some(instance_id)
    });

    spawned.unwrap_or_else(|| panic!("mock engine cannot construct `{class_name}`"))
}

/// Makes `child` a child of `parent` on the engine side, without going through the binding.
pub fn engine_add_child(parent: u64, child: u64) {
    with_world(|w| w.attach(parent, child));
}

/// Frees an object on the engine side, e.g. `queue_free()` from a script. Not recorded as a free call of the binding.
pub fn engine_free(instance_id: u64) -> bool {
    with_world(|w| w.destroy_tree(instance_id))
}

/// Adds a reference held by the engine itself, e.g. a resource cache.
pub fn engine_reference(instance_id: u64) {
    with_world(|w| {
        if let Some(object) = w.objects.get_mut(&instance_id) {
            object.refcount += 1;
        }
    });
}

/// Drops a reference held by the engine itself. Frees the object if it was the last one.
pub fn engine_unreference(instance_id: u64) {
    with_world(|w| {
        let Some(object) = w.objects.get_mut(&instance_id) else {
            return;
        };

        object.refcount -= 1;
        if object.refcount <= 0 {
            w.destroy_tree(instance_id);
        }
    });
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// World

#[derive(Clone, Debug)]
enum Value {
    Text(String),

    /// Array of objects, by instance ID.
    Objects(Vec<u64>),

    /// Payload of a variant: its type and an integer representation.
    Variant(VariantType, i64),

    /// Builtin types that the mock does not model.
    Opaque,
}

/// What a world ID was allocated as. Frees must match it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ValueKind {
    Builtin(VariantType),
    Variant,
}

#[derive(Debug)]
struct StoredValue {
    kind: ValueKind,
    value: Value,
}

/// What an object pointer points to. Never deallocated.
#[repr(C)]
struct ObjectCell {
    instance_id: u64,
}

#[derive(Debug)]
struct MockObject {
    class_name: String,

    /// Address of the leaked `ObjectCell`.
    cell: usize,
    refcount: i64,
    name: String,

    /// Label text, resource path.
    text: String,
    parent: Option<u64>,
    children: Vec<u64>,
}

/// Engine-side implementation of one bindable method.
type MethodFn = unsafe fn(&mut World, &Call);

struct MethodBind {
    class_name: &'static str,
    method_name: &'static str,
    func: MethodFn,
}

struct World {
    class_db: ClassDb,
    next_value_id: u64,
    next_instance_id: u64,
    builtins: HashMap<u64, StoredValue>,
    objects: HashMap<u64, MockObject>,
    binds: Vec<MethodBind>,
}

impl World {
    fn new() -> Self {
        let class_db = ClassDb::from_json(TEST_API_JSON).unwrap_or_else(|e| panic!("mock engine: {e}"));

        Self {
            class_db,
            next_value_id: 1,
            next_instance_id: 1,
            builtins: HashMap::new(),
            objects: HashMap::new(),
            binds: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Builtins

    fn alloc_value(&mut self, kind: ValueKind, value: Value) -> u64 {
        let id = self.next_value_id;
        self.next_value_id += 1;

        self.builtins.insert(id, StoredValue { kind, value });
        id
    }

    fn alloc_default(&mut self, ty: VariantType) -> u64 {
        let value = match ty {
            VariantType::String | VariantType::StringName => Value::Text(String::new()),
            VariantType::Array => Value::Objects(Vec::new()),
            _ => Value::Opaque,
        };

        self.alloc_value(ValueKind::Builtin(ty), value)
    }

    /// Overwrites the value with ID `id` in place, like an engine assignment into an initialized return slot.
    ///
    /// Returns the ID that holds the value afterwards; a new one if `id` was not a live value of the same kind.
    fn assign_value(&mut self, id: u64, kind: ValueKind, value: Value) -> u64 {
        match self.builtins.get_mut(&id) {
            Some(existing) if existing.kind == kind => {
                existing.value = value;
                id
            }
            _ => {
                record_message(
                    MessageLevel::Warning,
                    format!("mock engine: return slot for {kind:?} was not initialized"),
                );
                self.alloc_value(kind, value)
            }
        }
    }

    fn free_value(&mut self, id: u64, kind: ValueKind) {
        match self.builtins.remove(&id) {
            Some(stored) if stored.kind == kind => match kind {
                ValueKind::Builtin(ty) => record_free(FreeEvent::Builtin(ty)),
                ValueKind::Variant => record_free(FreeEvent::Variant),
            },
            Some(stored) => {
                record_bad_free(&format!("{kind:?} #{id}, which holds a {:?}", stored.kind));
                self.builtins.insert(id, stored);
            }
            None => record_bad_free(&format!("{kind:?} #{id}")),
        }
    }

    fn text(&self, id: u64) -> String {
        match self.builtins.get(&id) {
            Some(StoredValue {
                value: Value::Text(text),
                ..
            }) => text.clone(),
            _ => String::new(),
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Objects

    fn construct(&mut self, class_name: &str) -> Option<u64> {
        let class = self.class_db.class(class_name)?;
        if !class.is_instantiable {
            return None;
        }

        let is_refcounted = class.is_refcounted;
        let mut instance_id = self.next_instance_id;
        self.next_instance_id += 1;

        if is_refcounted {
            instance_id |= REFCOUNTED_BIT;
        }

        let cell: &'static mut ObjectCell = Box::leak(Box::new(ObjectCell { instance_id }));
        self.objects.insert(
            instance_id,
            MockObject {
                class_name: class_name.to_string(),
                cell: cell as *mut ObjectCell as usize,
                refcount: if is_refcounted { 1 } else { 0 },
                name: class_name.to_string(),
                text: String::new(),
                parent: None,
                children: Vec::new(),
            },
        );

        Some(instance_id)
    }

    fn object_ptr(&self, instance_id: u64) -> sys::GDExtensionObjectPtr {
        self.objects
            .get(&instance_id)
            .map_or(std::ptr::null_mut(), |o| o.cell as sys::GDExtensionObjectPtr)
    }

    fn attach(&mut self, parent: u64, child: u64) {
        if parent == child || !self.objects.contains_key(&parent) {
            return;
        }

        let previous = match self.objects.get_mut(&child) {
            Some(object) => object.parent.replace(parent),
            None => return,
        };

        if let Some(previous) = previous.and_then(|p| self.objects.get_mut(&p)) {
            previous.children.retain(|&c| c != child);
        }

        if let Some(parent) = self.objects.get_mut(&parent) {
            parent.children.push(child);
        }
    }

    /// Destroys an object and, like the engine does for nodes, all of its children. Returns whether it was alive.
    fn destroy_tree(&mut self, instance_id: u64) -> bool {
        let Some(object) = self.objects.remove(&instance_id) else {
            return false;
        };

        if let Some(parent) = object.parent.and_then(|p| self.objects.get_mut(&p)) {
            parent.children.retain(|&c| c != instance_id);
        }

        for child in object.children {
            self.destroy_tree(child);
        }

        true
    }

    fn is_instance_of(&self, instance_id: u64, class_name: &str) -> bool {
        self.objects
            .get(&instance_id)
            .is_some_and(|o| self.class_db.inherits(&o.class_name, class_name))
    }

    /// Class tag: 1-based position of the class in the database; 0 for unknown classes.
    fn class_tag(&self, class_name: &str) -> usize {
        self.class_db
            .classes()
            .position(|c| c.name == class_name)
            .map_or(0, |index| index + 1)
    }

    fn class_by_tag(&self, tag: usize) -> Option<String> {
        let index = tag.checked_sub(1)?;
        self.class_db.classes().nth(index).map(|c| c.name.clone())
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Method binds

    /// Resolves a method bind by class, name and hash, like `classdb_get_method_bind`. Bind pointers are 1-based indices.
    fn method_bind(&mut self, class_name: &str, method_name: &str, hash: i64) -> usize {
        let known_hash = self
            .class_db
            .class(class_name)
            .and_then(|c| c.bindable_methods.iter().find(|m| m.name == method_name))
            .map(|m| m.hash);

        if known_hash != Some(hash) {
            record_message(
                MessageLevel::Error,
                format!("mock engine: no method {class_name}::{method_name} with hash {hash}"),
            );
            return 0;
        }

        if let Some(index) = self
            .binds
            .iter()
            .position(|b| b.class_name == class_name && b.method_name == method_name)
        {
            return index + 1;
        }

        let Some((class_name, method_name, func)) = methods::lookup(class_name, method_name) else {
            record_message(
                MessageLevel::Error,
                format!("mock engine: {class_name}::{method_name} is not implemented"),
            );
            return 0;
        };

        self.binds.push(MethodBind {
            class_name,
            method_name,
            func,
        });
        self.binds.len()
    }

    fn bind(&self, bind_ptr: usize) -> Option<&MethodBind> {
        self.binds.get(bind_ptr.checked_sub(1)?)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Ptrcall arguments and returns

/// Receiver, arguments and return slot of one ptrcall, as seen by a method implementation.
struct Call {
    instance: Option<u64>,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
}

impl Call {
    /// # Safety
    /// The caller must have passed at least `index + 1` arguments.
    unsafe fn arg_word(&self, index: usize) -> u64 {
        let arg = *self.args.add(index);
        *(arg as *const u64)
    }

    unsafe fn arg_i64(&self, index: usize) -> i64 {
        self.arg_word(index) as i64
    }

    unsafe fn arg_bool(&self, index: usize) -> bool {
        let arg = *self.args.add(index);
        *(arg as *const u8) != 0
    }

    /// Instance ID of an object argument; `None` for null.
    unsafe fn arg_object(&self, index: usize) -> Option<u64> {
        let ptr = self.arg_word(index) as sys::GDExtensionConstObjectPtr;
        if ptr.is_null() {
            None
        } else {
            Some(instance_id_of(ptr))
        }
    }

    /// Contents of a string or string name argument.
    unsafe fn arg_text(&self, world: &World, index: usize) -> String {
        world.text(self.arg_word(index))
    }

    unsafe fn ret_i64(&self, value: i64) {
        *(self.ret as *mut i64) = value;
    }

    unsafe fn ret_bool(&self, value: bool) {
        *(self.ret as *mut u8) = value as u8;
    }

    unsafe fn ret_object(&self, world: &World, instance_id: Option<u64>) {
        let ptr = instance_id.map_or(std::ptr::null_mut(), |id| world.object_ptr(id));
        *(self.ret as *mut sys::GDExtensionObjectPtr) = ptr;
    }

    /// Assigns a builtin value into the initialized return slot.
    unsafe fn ret_builtin(&self, world: &mut World, ty: VariantType, value: Value) {
        let slot = self.ret as *mut u64;
        *slot = world.assign_value(*slot, ValueKind::Builtin(ty), value);
    }

    /// Assigns a variant into the initialized return slot.
    unsafe fn ret_variant(&self, world: &mut World, ty: VariantType, payload: i64) {
        let slot = self.ret as *mut u64;
        *slot.add(1) = world.assign_value(*slot.add(1), ValueKind::Variant, Value::Variant(ty, payload));
        *slot = ty.sys() as u64;
    }
}

/// Instance ID stored in an object cell.
///
/// # Safety
/// `ptr` must come from the mock engine; cells are never freed, so stale pointers can be read.
unsafe fn instance_id_of(ptr: sys::GDExtensionConstObjectPtr) -> u64 {
    (*(ptr as *const ObjectCell)).instance_id
}
