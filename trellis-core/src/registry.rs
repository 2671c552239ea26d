//! Data-type identifiers and the type registry.
//!
//! Rows declare their "true" data type by string id so the set of types
//! stays open for extension. The registry maps an id to its capability
//! descriptor; the serializer resolves every id against a registry once at
//! table-load time rather than on every access.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Interned string identifier of a registered data type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTypeId(String);

impl DataTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Capability descriptor for one registered data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeInfo {
    pub id: DataTypeId,
    /// Human-readable name shown in tabular views.
    pub name: String,
    pub description: Option<String>,
}

impl DataTypeInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DataTypeId::new(id),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Closed registry mapping type ids to capability descriptors.
///
/// The serializer takes a registry value explicitly. A process-wide default
/// instance is available through [`DataTypeRegistry::global`] for callers
/// that share one registry across the whole pipeline; it is a convenience,
/// not a hidden dependency of any API in this workspace.
#[derive(Debug, Default)]
pub struct DataTypeRegistry {
    types: HashMap<DataTypeId, DataTypeInfo>,
}

impl DataTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type descriptor, replacing any previous entry for the id.
    pub fn register(&mut self, info: DataTypeInfo) {
        self.types.insert(info.id.clone(), info);
    }

    pub fn get(&self, id: &DataTypeId) -> Option<&DataTypeInfo> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &DataTypeId) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The process-wide default registry instance.
    pub fn global() -> &'static RwLock<DataTypeRegistry> {
        static GLOBAL: Lazy<RwLock<DataTypeRegistry>> =
            Lazy::new(|| RwLock::new(DataTypeRegistry::new()));
        &GLOBAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DataTypeRegistry::new();
        registry.register(DataTypeInfo::new("imagej-imgplus", "Image"));
        let id = DataTypeId::new("imagej-imgplus");
        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).unwrap().name, "Image");
        assert!(!registry.contains(&DataTypeId::new("missing")));
    }

    #[test]
    fn test_register_replaces_by_id() {
        let mut registry = DataTypeRegistry::new();
        registry.register(DataTypeInfo::new("mask", "Mask"));
        registry.register(DataTypeInfo::new("mask", "Binary mask"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&DataTypeId::new("mask")).unwrap().name, "Binary mask");
    }
}
