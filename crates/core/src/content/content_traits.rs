use async_trait::async_trait;

use super::{Dimensions, Node, NodeTemplate};
use crate::errors::Result;

/// Repository trait for the content tree the importer writes into.
#[async_trait]
pub trait ContentRepositoryTrait: Send + Sync {
    /// Finds a node by identifier in the given dimension set.
    fn get_by_identifier(&self, identifier: &str, dimensions: &Dimensions) -> Result<Option<Node>>;

    /// Finds a node by absolute path in the given dimension set.
    fn get_by_path(&self, path: &str, dimensions: &Dimensions) -> Result<Option<Node>>;

    /// Number of direct children of a node.
    fn count_children(&self, parent: &Node) -> Result<i64>;

    /// Creates a child of `parent` from a template, in the parent's dimension set.
    async fn create_child(&self, parent: &Node, template: NodeTemplate) -> Result<Node>;

    /// Persists the current properties of a node.
    async fn save_properties(&self, node: &Node) -> Result<Node>;

    /// Returns the variant of a node in another dimension set, creating it
    /// with a copy of the node's properties when missing.
    async fn variant(&self, node: &Node, dimensions: &Dimensions) -> Result<Node>;
}
