/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Class database, read from an `extension_api.json` document.
//!
//! Only the parts needed for marshaling are modeled: the class hierarchy, reference-counting, and method hashes used to resolve
//! method binds. Unknown fields are ignored, so a full engine dump deserializes as well.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::InitLevel;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// JSON models

#[derive(Deserialize, Clone, Debug)]
pub struct JsonExtensionApi {
    pub header: JsonHeader,
    pub classes: Vec<JsonClass>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub version_patch: u8,
    #[serde(default)]
    pub version_status: String,
    pub version_full_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonClass {
    pub name: String,
    pub is_refcounted: bool,
    pub is_instantiable: bool,
    pub inherits: Option<String>,
    pub api_type: String,
    #[serde(default)]
    pub methods: Vec<JsonClassMethod>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonClassMethod {
    pub name: String,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_vararg: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    pub hash: Option<i64>,
    pub return_value: Option<JsonMethodReturn>,
    #[serde(default)]
    pub arguments: Vec<JsonMethodArg>,
}

// Example: set_text -> [ {name: "text", type: "String"} ]
#[derive(Deserialize, Clone, Debug)]
pub struct JsonMethodArg {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub meta: Option<String>,
    pub default_value: Option<String>,
}

// Example: get_line_count -> {type: "int", meta: "int32"}
#[derive(Deserialize, Clone, Debug)]
pub struct JsonMethodReturn {
    #[serde(rename = "type")]
    pub type_: String,
    pub meta: Option<String>,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Indexed class database

/// Failure to read the class database.
#[derive(Debug)]
pub struct ApiLoadError {
    source: serde_json::Error,
}

impl fmt::Display for ApiLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse extension API JSON: {}", self.source)
    }
}

impl std::error::Error for ApiLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Class as known to the binding: hierarchy, init level and resolvable methods.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: String,
    pub inherits: Option<String>,
    pub is_refcounted: bool,
    pub is_instantiable: bool,
    pub init_level: InitLevel,

    /// Non-virtual methods with a hash, i.e. those reachable through `classdb_get_method_bind`.
    pub bindable_methods: Vec<MethodInfo>,

    /// Names of methods that extension classes may override, e.g. `_ready`.
    pub virtual_methods: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct MethodInfo {
    pub name: String,
    pub hash: i64,
    pub arg_count: usize,
    pub has_return: bool,
}

/// Immutable, indexed view of the extension API.
#[derive(Debug)]
pub struct ClassDb {
    header: JsonHeader,
    classes: Vec<ClassInfo>,
    index_by_name: HashMap<String, usize>,
}

impl ClassDb {
    pub fn from_json(json: &str) -> Result<Self, ApiLoadError> {
        let api: JsonExtensionApi =
            serde_json::from_str(json).map_err(|source| ApiLoadError { source })?;

        Ok(Self::from_api(api))
    }

    pub fn from_api(api: JsonExtensionApi) -> Self {
        let mut classes = Vec::with_capacity(api.classes.len());
        let mut index_by_name = HashMap::with_capacity(api.classes.len());

        for class in api.classes {
            let init_level = class_init_level(&class);

            let bindable_methods = class
                .methods
                .iter()
                .filter(|m| !m.is_virtual)
                .filter_map(|m| {
                    Some(MethodInfo {
                        name: m.name.clone(),
                        hash: m.hash?,
                        arg_count: m.arguments.len(),
                        has_return: m.return_value.is_some(),
                    })
                })
                .collect();

            let virtual_methods = class
                .methods
                .iter()
                .filter(|m| m.is_virtual)
                .map(|m| m.name.clone())
                .collect();

            index_by_name.insert(class.name.clone(), classes.len());
            classes.push(ClassInfo {
                name: class.name,
                inherits: class.inherits,
                is_refcounted: class.is_refcounted,
                is_instantiable: class.is_instantiable,
                init_level,
                bindable_methods,
                virtual_methods,
            });
        }

        Self {
            header: api.header,
            classes,
            index_by_name,
        }
    }

    pub fn header(&self) -> &JsonHeader {
        &self.header
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.index_by_name.get(name).map(|&i| &self.classes[i])
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter()
    }

    /// Classes whose method binds become available at `level`.
    pub fn classes_at_level(&self, level: InitLevel) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter().filter(move |c| c.init_level == level)
    }

    /// Whether `derived` is `base` or (transitively) inherits from it.
    ///
    /// Unknown class names never inherit anything.
    pub fn inherits(&self, derived: &str, base: &str) -> bool {
        let mut current = Some(derived);

        // Bounded by the number of classes, so a malformed cyclic hierarchy cannot loop forever.
        for _ in 0..=self.classes.len() {
            let Some(name) = current else {
                return false;
            };

            if name == base {
                return true;
            }

            current = self.class(name).and_then(|c| c.inherits.as_deref());
        }

        false
    }

    /// Whether `class` or one of its ancestors declares the virtual method `method`.
    pub fn has_virtual(&self, class: &str, method: &str) -> bool {
        self.ancestry(class)
            .into_iter()
            .filter_map(|name| self.class(name))
            .any(|info| info.virtual_methods.iter().any(|m| m == method))
    }

    /// Chain from `class` up to the root, starting with `class` itself.
    pub fn ancestry(&self, class: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.class(class);

        while let Some(info) = current {
            if chain.contains(&info.name.as_str()) {
                break;
            }

            chain.push(info.name.as_str());
            current = info.inherits.as_deref().and_then(|parent| self.class(parent));
        }

        chain
    }
}

/// Assigns each class to the init level at which the engine makes it available.
fn class_init_level(class: &JsonClass) -> InitLevel {
    if class.api_type == "editor" {
        InitLevel::Editor
    } else if matches!(class.name.as_str(), "Object" | "RefCounted" | "Resource") {
        InitLevel::Core
    } else if class.name.ends_with("Server") || class.name.contains("Server2D") || class.name.contains("Server3D") {
        InitLevel::Servers
    } else {
        InitLevel::Scene
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "header": { "version_major": 4, "version_minor": 3, "version_patch": 0, "version_status": "stable",
                    "version_full_name": "Godot Engine v4.3.stable" },
        "classes": [
            { "name": "Object", "is_refcounted": false, "is_instantiable": true, "inherits": null, "api_type": "core",
              "methods": [ { "name": "get_class", "is_const": true, "hash": 201670096,
                             "return_value": { "type": "String" } } ] },
            { "name": "RefCounted", "is_refcounted": true, "is_instantiable": true, "inherits": "Object", "api_type": "core",
              "methods": [ { "name": "unreference", "hash": 2240911060, "return_value": { "type": "bool" } } ] },
            { "name": "Node", "is_refcounted": false, "is_instantiable": true, "inherits": "Object", "api_type": "core",
              "methods": [ { "name": "_ready", "is_virtual": true },
                           { "name": "add_child", "hash": 3863233950,
                             "arguments": [ { "name": "node", "type": "Node" } ] } ] },
            { "name": "PhysicsServer3D", "is_refcounted": false, "is_instantiable": false, "inherits": "Object",
              "api_type": "core" },
            { "name": "EditorPlugin", "is_refcounted": false, "is_instantiable": false, "inherits": "Node",
              "api_type": "editor", "unknown_field": [1, 2, 3] }
        ]
    }"#;

    #[test]
    fn parses_and_indexes() {
        let db = ClassDb::from_json(SAMPLE).expect("valid JSON");

        assert_eq!(db.header().version_minor, 3);
        assert_eq!(db.classes().count(), 5);

        let node = db.class("Node").expect("Node present");
        assert_eq!(node.inherits.as_deref(), Some("Object"));
        assert_eq!(node.bindable_methods.len(), 1, "virtual methods are not bindable");
        assert_eq!(node.bindable_methods[0].arg_count, 1);
    }

    #[test]
    fn init_levels() {
        let db = ClassDb::from_json(SAMPLE).unwrap();

        assert_eq!(db.class("Object").unwrap().init_level, InitLevel::Core);
        assert_eq!(db.class("PhysicsServer3D").unwrap().init_level, InitLevel::Servers);
        assert_eq!(db.class("Node").unwrap().init_level, InitLevel::Scene);
        assert_eq!(db.class("EditorPlugin").unwrap().init_level, InitLevel::Editor);
    }

    #[test]
    fn inheritance() {
        let db = ClassDb::from_json(SAMPLE).unwrap();

        assert!(db.inherits("EditorPlugin", "Object"));
        assert!(db.inherits("Node", "Node"));
        assert!(!db.inherits("Node", "RefCounted"));
        assert!(!db.inherits("Unknown", "Object"));
        assert_eq!(db.ancestry("EditorPlugin"), ["EditorPlugin", "Node", "Object"]);
    }

    #[test]
    fn virtual_methods_are_inherited() {
        let db = ClassDb::from_json(SAMPLE).unwrap();

        assert_eq!(db.class("Node").unwrap().virtual_methods, ["_ready"]);
        assert!(db.has_virtual("EditorPlugin", "_ready"));
        assert!(!db.has_virtual("Object", "_ready"));
        assert!(!db.has_virtual("Node", "add_child"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ClassDb::from_json("{ \"header\": 1 }").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse extension API JSON"));
    }
}
