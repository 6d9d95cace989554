use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::constants::DEFAULT_STORAGE_NODE_TYPE;
use crate::errors::{ConfigurationError, Result};
use crate::settings::NodeTypeSettings;

/// Schema of a node type: the set of declared property names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeType {
    pub name: String,
    pub properties: BTreeSet<String>,
}

impl NodeType {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }
}

/// Node types known to the importer, with super type properties merged in.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    types: HashMap<String, NodeType>,
}

impl NodeTypeRegistry {
    pub fn from_settings(settings: &BTreeMap<String, NodeTypeSettings>) -> Self {
        let mut types = HashMap::new();

        // storage nodes need a document type even when none is configured
        types.insert(
            DEFAULT_STORAGE_NODE_TYPE.to_string(),
            NodeType {
                name: DEFAULT_STORAGE_NODE_TYPE.to_string(),
                properties: ["title", "uriPathSegment"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        );

        for name in settings.keys() {
            let mut properties = BTreeSet::new();
            let mut visited = BTreeSet::new();
            collect_properties(name, settings, &mut properties, &mut visited);
            if let Some(builtin) = types.get(name) {
                properties.extend(builtin.properties.iter().cloned());
            }
            types.insert(
                name.clone(),
                NodeType {
                    name: name.clone(),
                    properties,
                },
            );
        }

        Self { types }
    }

    pub fn get(&self, name: &str) -> Result<&NodeType> {
        self.types
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownNodeType(name.to_string()).into())
    }
}

fn collect_properties(
    name: &str,
    settings: &BTreeMap<String, NodeTypeSettings>,
    properties: &mut BTreeSet<String>,
    visited: &mut BTreeSet<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    if name == DEFAULT_STORAGE_NODE_TYPE && !settings.contains_key(name) {
        properties.insert("title".to_string());
        properties.insert("uriPathSegment".to_string());
        return;
    }
    if let Some(node_type) = settings.get(name) {
        properties.extend(node_type.properties.iter().cloned());
        for super_type in &node_type.super_types {
            collect_properties(super_type, settings, properties, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_type_properties_are_merged() {
        let mut settings = BTreeMap::new();
        settings.insert(
            "Person".to_string(),
            NodeTypeSettings {
                properties: vec!["email".to_string()],
                super_types: vec!["Page".to_string()],
            },
        );
        let registry = NodeTypeRegistry::from_settings(&settings);
        let person = registry.get("Person").unwrap();
        assert!(person.has_property("email"));
        assert!(person.has_property("title"));
        assert!(person.has_property("uriPathSegment"));
    }

    #[test]
    fn test_cyclic_super_types_terminate() {
        let mut settings = BTreeMap::new();
        settings.insert(
            "A".to_string(),
            NodeTypeSettings {
                properties: vec!["a".to_string()],
                super_types: vec!["B".to_string()],
            },
        );
        settings.insert(
            "B".to_string(),
            NodeTypeSettings {
                properties: vec!["b".to_string()],
                super_types: vec!["A".to_string()],
            },
        );
        let registry = NodeTypeRegistry::from_settings(&settings);
        let a = registry.get("A").unwrap();
        assert!(a.has_property("a") && a.has_property("b"));
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = NodeTypeRegistry::from_settings(&BTreeMap::new());
        assert!(registry.get("Page").is_ok());
        assert!(registry.get("Missing").is_err());
    }
}
