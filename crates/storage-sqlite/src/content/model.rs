//! Database models for content nodes.
//!
//! A node is stored once per dimension set. Dimensions and properties are
//! JSON text columns.

use diesel::prelude::*;
use serde_json::Value;

use crate::errors::StorageError;
use crate::utils::{timestamp_from_text, timestamp_to_text};
use contentimport_core::content::{dimensions_key, Dimensions, Node, Properties};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::content_nodes)]
#[diesel(primary_key(identifier, dimensions_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContentNodeDB {
    pub identifier: String,
    pub dimensions_key: String,
    pub path: String,
    pub parent_path: String,
    pub name: String,
    pub node_type: String,
    pub dimensions: String,
    pub properties: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Path of the parent, `/` for nodes directly below the root.
pub fn parent_path_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => path[..index].to_string(),
    }
}

impl TryFrom<&Node> for ContentNodeDB {
    type Error = StorageError;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        Ok(Self {
            identifier: node.identifier.clone(),
            dimensions_key: dimensions_key(&node.dimensions),
            path: node.path.clone(),
            parent_path: parent_path_of(&node.path),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            dimensions: serde_json::to_string(&node.dimensions)?,
            properties: serde_json::to_string(&node.properties)?,
            created_at: timestamp_to_text(&node.created_at),
            updated_at: timestamp_to_text(&node.updated_at),
        })
    }
}

impl TryFrom<ContentNodeDB> for Node {
    type Error = StorageError;

    fn try_from(db: ContentNodeDB) -> Result<Self, Self::Error> {
        let dimensions: Dimensions = serde_json::from_str(&db.dimensions)?;
        let properties = match serde_json::from_str::<Value>(&db.properties)? {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        Ok(Self {
            identifier: db.identifier,
            path: db.path,
            name: db.name,
            node_type: db.node_type,
            dimensions,
            properties,
            created_at: timestamp_from_text(&db.created_at),
            updated_at: timestamp_from_text(&db.updated_at),
        })
    }
}
