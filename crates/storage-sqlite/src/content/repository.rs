use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use contentimport_core::content::{
    dimensions_key as key_of, ContentRepositoryTrait, Dimensions, Node, NodeTemplate,
};
use contentimport_core::errors::{DatabaseError, Error};
use contentimport_core::Result;
use contentimport_core::utils::time_utils::now_utc;

use super::model::ContentNodeDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::content_nodes;
use crate::schema::content_nodes::dsl::*;
use crate::utils::timestamp_to_text;

pub struct ContentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ContentRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ContentRepository { pool, writer }
    }
}

fn load_node(
    conn: &mut SqliteConnection,
    node_identifier: &str,
    key: &str,
) -> Result<Option<Node>> {
    let row = content_nodes
        .find((node_identifier, key))
        .first::<ContentNodeDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    Ok(row.map(Node::try_from).transpose()?)
}

#[async_trait]
impl ContentRepositoryTrait for ContentRepository {
    fn get_by_identifier(&self, node_identifier: &str, dims: &Dimensions) -> Result<Option<Node>> {
        let mut conn = get_connection(&self.pool)?;
        load_node(&mut conn, node_identifier, &key_of(dims))
    }

    fn get_by_path(&self, node_path: &str, dims: &Dimensions) -> Result<Option<Node>> {
        if node_path == "/" {
            return Ok(Some(Node::root()));
        }
        let mut conn = get_connection(&self.pool)?;
        let row = content_nodes
            .filter(path.eq(node_path))
            .filter(dimensions_key.eq(key_of(dims)))
            .first::<ContentNodeDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Node::try_from).transpose()?)
    }

    fn count_children(&self, parent: &Node) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let total = content_nodes
            .filter(parent_path.eq(&parent.path))
            .filter(dimensions_key.eq(key_of(&parent.dimensions)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total)
    }

    async fn create_child(&self, parent: &Node, template: NodeTemplate) -> Result<Node> {
        let now = now_utc();
        let node = Node {
            identifier: template
                .identifier
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            path: parent.child_path(&template.name),
            name: template.name,
            node_type: template.node_type,
            dimensions: parent.dimensions.clone(),
            properties: template.properties,
            created_at: now,
            updated_at: now,
        };
        let row = ContentNodeDB::try_from(&node)?;
        let parent = parent.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Node> {
                if !parent.is_root()
                    && load_node(conn, &parent.identifier, &row.dimensions_key)?.is_none()
                {
                    return Err(Error::NodeNotFound(parent.context_path()));
                }
                diesel::insert_into(content_nodes::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|e| {
                        let err: Error = StorageError::from(e).into();
                        match err {
                            Error::Database(DatabaseError::UniqueViolation(_)) => {
                                Error::Database(DatabaseError::UniqueViolation(
                                    node.context_path(),
                                ))
                            }
                            other => other,
                        }
                    })?;
                debug!("Created node {} ({})", node.context_path(), node.node_type);
                Ok(node)
            })
            .await
    }

    async fn save_properties(&self, node: &Node) -> Result<Node> {
        let mut saved = node.clone();
        saved.updated_at = now_utc();
        let json = serde_json::to_string(&saved.properties).map_err(StorageError::from)?;
        let updated_text = timestamp_to_text(&saved.updated_at);
        let key = key_of(&saved.dimensions);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Node> {
                let affected = diesel::update(content_nodes.find((&saved.identifier, &key)))
                    .set((properties.eq(&json), updated_at.eq(&updated_text)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::NodeNotFound(saved.context_path()));
                }
                Ok(saved)
            })
            .await
    }

    async fn variant(&self, node: &Node, dims: &Dimensions) -> Result<Node> {
        let mut variant = node.clone();
        variant.dimensions = dims.clone();
        let now = now_utc();
        variant.created_at = now;
        variant.updated_at = now;
        let row = ContentNodeDB::try_from(&variant)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Node> {
                if let Some(existing) = load_node(conn, &row.identifier, &row.dimensions_key)? {
                    return Ok(existing);
                }
                diesel::insert_into(content_nodes::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Created variant {}", variant.context_path());
                Ok(variant)
            })
            .await
    }
}
