//! Node and node template models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::utils::time_utils::now_utc;

/// Property bag of a node.
pub type Properties = Map<String, Value>;

/// Dimension name to value, e.g. `language = "en"`. Empty for the default variant.
pub type Dimensions = BTreeMap<String, String>;

/// Stable string key for a dimension set (`language=en&market=ch`).
pub fn dimensions_key(dimensions: &Dimensions) -> String {
    dimensions
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// A persisted node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub identifier: String,
    pub path: String,
    pub name: String,
    pub node_type: String,
    pub dimensions: Dimensions,
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// The implicit root node. It is never stored.
    pub fn root() -> Self {
        let now = now_utc();
        Self {
            identifier: "root".to_string(),
            path: "/".to_string(),
            name: String::new(),
            node_type: "unstructured".to_string(),
            dimensions: Dimensions::new(),
            properties: Properties::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Path of a child with the given name.
    pub fn child_path(&self, name: &str) -> String {
        if self.is_root() {
            format!("/{}", name)
        } else {
            format!("{}/{}", self.path, name)
        }
    }

    /// Title property if present, node name otherwise.
    pub fn label(&self) -> String {
        self.properties
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.name.clone())
    }

    /// Context path as shown in event messages (`/sites/demo/storage@language=en`).
    pub fn context_path(&self) -> String {
        if self.dimensions.is_empty() {
            self.path.clone()
        } else {
            format!("{}@{}", self.path, dimensions_key(&self.dimensions))
        }
    }
}

/// A node that does not exist yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeTemplate {
    pub node_type: String,
    pub name: String,
    pub identifier: Option<String>,
    pub properties: Properties,
}

impl NodeTemplate {
    pub fn new(node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.into(),
            identifier: None,
            properties: Properties::new(),
        }
    }
}

/// Anything the property mapper can write to.
pub trait PropertyTarget: Send {
    fn node_type(&self) -> &str;

    fn property(&self, name: &str) -> Option<&Value>;

    fn set_property(&mut self, name: &str, value: Value);

    /// The persisted node, if the target is one.
    fn as_node(&self) -> Option<&Node> {
        None
    }

    /// Forces the identifier of a node that is about to be created.
    fn set_identifier(&mut self, _identifier: &str) {}
}

impl PropertyTarget for Node {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    fn as_node(&self) -> Option<&Node> {
        Some(self)
    }
}

impl PropertyTarget for NodeTemplate {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    fn set_identifier(&mut self, identifier: &str) {
        self.identifier = Some(identifier.to_string());
    }
}
