// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared cache of enumerated type descriptions.
//!
//! The registry resolves a type [`NodeId`] to an immutable
//! [`TypeDescription`] handed out behind an `Arc`. Unknown types resolve to
//! an empty description, which the codec treats as "no metadata known".
//!
//! Descriptions can be loaded from JSON or YAML documents of the form:
//!
//! ```yaml
//! types:
//!   - type_id: "ns=2;i=3063"
//!     alias: MachineState
//!     fields:
//!       - { name: Idle, code: 0 }
//!       - { name: Running, code: 1 }
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

use crate::error::{ConfigurationError, OpcUaResult};
use crate::types::{NodeId, TypeDescription};

/// Document wrapper used when loading descriptions from text.
#[derive(Debug, Deserialize)]
struct TypeDocument {
    #[serde(default)]
    types: Vec<TypeDescription>,
}

// =============================================================================
// TypeRegistry
// =============================================================================

/// Thread-safe cache of type descriptions keyed by type id.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<NodeId, Arc<TypeDescription>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `descriptions`.
    ///
    /// Later entries replace earlier ones with the same type id.
    pub fn from_descriptions(descriptions: impl IntoIterator<Item = TypeDescription>) -> Self {
        let registry = Self::new();
        for description in descriptions {
            registry.register(description);
        }
        registry
    }

    /// Registers a description, returning the one it replaced.
    pub fn register(&self, description: TypeDescription) -> Option<Arc<TypeDescription>> {
        let type_id = description.type_id().clone();
        tracing::debug!(
            type_id = %type_id,
            fields = description.fields().len(),
            "Registered type description"
        );
        self.types.insert(type_id, Arc::new(description))
    }

    /// Returns the description for `type_id`, if registered.
    pub fn get(&self, type_id: &NodeId) -> Option<Arc<TypeDescription>> {
        self.types.get(type_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the description for `type_id`, or an empty one if unknown.
    pub fn get_or_empty(&self, type_id: &NodeId) -> Arc<TypeDescription> {
        self.get(type_id).unwrap_or_else(|| {
            tracing::trace!(type_id = %type_id, "No type description, using empty");
            Arc::new(TypeDescription::empty(type_id.clone()))
        })
    }

    /// Finds a description by its display alias, ignoring ASCII case.
    pub fn find_by_alias(&self, alias: &str) -> Option<Arc<TypeDescription>> {
        self.types
            .iter()
            .find(|entry| {
                entry
                    .value()
                    .alias()
                    .is_some_and(|a| a.eq_ignore_ascii_case(alias))
            })
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Resolves a type by node id text or alias.
    pub fn lookup(&self, key: &str) -> Option<Arc<TypeDescription>> {
        match key.parse::<NodeId>() {
            Ok(type_id) => self.get(&type_id),
            Err(_) => self.find_by_alias(key),
        }
    }

    /// Removes a description.
    pub fn remove(&self, type_id: &NodeId) -> Option<Arc<TypeDescription>> {
        self.types.remove(type_id).map(|(_, description)| description)
    }

    /// Returns `true` if `type_id` is registered.
    pub fn contains(&self, type_id: &NodeId) -> bool {
        self.types.contains_key(type_id)
    }

    /// Returns the number of registered descriptions.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns all registered type ids.
    pub fn type_ids(&self) -> Vec<NodeId> {
        self.types.iter().map(|entry| entry.key().clone()).collect()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads descriptions from a JSON document and returns how many were added.
    pub fn load_json(&self, text: &str) -> OpcUaResult<usize> {
        let document: TypeDocument = serde_json::from_str(text)
            .map_err(|e| ConfigurationError::invalid_type_description(e.to_string()))?;
        Ok(self.extend(document))
    }

    /// Loads descriptions from a YAML document and returns how many were added.
    pub fn load_yaml(&self, text: &str) -> OpcUaResult<usize> {
        let document: TypeDocument = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigurationError::invalid_type_description(e.to_string()))?;
        Ok(self.extend(document))
    }

    fn extend(&self, document: TypeDocument) -> usize {
        let count = document.types.len();
        for description in document.types {
            self.register(description);
        }
        count
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumField;

    fn machine_state() -> TypeDescription {
        TypeDescription::new(
            NodeId::numeric(2, 3063),
            vec![EnumField::new("Idle", 0), EnumField::new("Running", 1)],
        )
        .with_alias("MachineState")
    }

    #[test]
    fn test_register_and_get() {
        let registry = TypeRegistry::new();
        assert!(registry.register(machine_state()).is_none());
        assert!(registry.register(machine_state()).is_some());
        assert_eq!(registry.len(), 1);

        let description = registry.get(&NodeId::numeric(2, 3063)).unwrap();
        assert_eq!(description.fields().len(), 2);
        assert!(registry.contains(&NodeId::numeric(2, 3063)));
    }

    #[test]
    fn test_shared_by_reference() {
        let registry = TypeRegistry::from_descriptions([machine_state()]);
        let a = registry.get(&NodeId::numeric(2, 3063)).unwrap();
        let b = registry.get(&NodeId::numeric(2, 3063)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_get_or_empty() {
        let registry = TypeRegistry::new();
        let description = registry.get_or_empty(&NodeId::numeric(5, 1));
        assert!(description.is_empty());
        assert_eq!(description.type_id(), &NodeId::numeric(5, 1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_by_id_or_alias() {
        let registry = TypeRegistry::from_descriptions([machine_state()]);
        assert!(registry.lookup("ns=2;i=3063").is_some());
        assert!(registry.lookup("machinestate").is_some());
        assert!(registry.lookup("Unknown").is_none());
        assert!(registry.remove(&NodeId::numeric(2, 3063)).is_some());
        assert!(registry.lookup("MachineState").is_none());
    }

    #[test]
    fn test_load_json() {
        let registry = TypeRegistry::new();
        let count = registry
            .load_json(
                r#"{"types": [
                    {"type_id": "ns=2;i=1", "fields": [{"name": "A", "code": 1}]},
                    {"type_id": "ns=2;i=2"}
                ]}"#,
            )
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(registry.type_ids().len(), 2);
        assert!(registry.get(&NodeId::numeric(2, 2)).unwrap().is_empty());
    }

    #[test]
    fn test_load_yaml() {
        let registry = TypeRegistry::new();
        let yaml = r#"
types:
  - type_id: "ns=2;i=3063"
    alias: MachineState
    fields:
      - name: Idle
        code: 0
      - name: Running
        code: 1
"#;
        assert_eq!(registry.load_yaml(yaml).unwrap(), 1);
        let description = registry.lookup("MachineState").unwrap();
        assert_eq!(description.find_by_code(1).map(EnumField::name), Some("Running"));
    }

    #[test]
    fn test_load_rejects_bad_node_id() {
        let registry = TypeRegistry::new();
        let result = registry.load_json(r#"{"types": [{"type_id": "nonsense"}]}"#);
        assert!(result.is_err());
        assert!(registry.is_empty());
    }
}
