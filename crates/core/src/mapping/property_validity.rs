use serde_json::{Map, Value};

use crate::content::NodeType;

/// Decides which record fields may be written to a node.
///
/// Fields starting with `_` or `@` are reserved for the importer, all
/// other fields must be declared on the node type.
pub struct ProviderPropertyValidity<'a> {
    node_type: &'a NodeType,
}

impl<'a> ProviderPropertyValidity<'a> {
    pub fn new(node_type: &'a NodeType) -> Self {
        Self { node_type }
    }

    pub fn is_valid(&self, property: &str) -> bool {
        !(property.starts_with('_') || property.starts_with('@'))
            && self.node_type.has_property(property)
    }

    /// Copy of `data` restricted to valid properties.
    pub fn filter(&self, data: &Map<String, Value>) -> Map<String, Value> {
        data.iter()
            .filter(|(name, _)| self.is_valid(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn person() -> NodeType {
        NodeType {
            name: "Person".to_string(),
            properties: ["title", "email", "_hidden"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_reserved_and_undeclared_properties_are_invalid() {
        let node_type = person();
        let validity = ProviderPropertyValidity::new(&node_type);
        assert!(validity.is_valid("title"));
        assert!(!validity.is_valid("_hidden"));
        assert!(!validity.is_valid("@dimensions"));
        assert!(!validity.is_valid("phone"));

        let data = json!({"title": "Jane", "phone": "1", "__label": "Jane"});
        let filtered = validity.filter(data.as_object().unwrap());
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("title"));
    }
}
