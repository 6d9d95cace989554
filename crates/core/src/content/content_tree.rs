use log::info;

use super::{ContentRepositoryTrait, Dimensions, Node, NodeTemplate};
use crate::errors::{Error, Result};

/// Returns the node at `path`, creating missing nodes on the way.
///
/// Intermediate nodes are `unstructured`; the last one gets `node_type`.
pub async fn ensure_path(
    repository: &dyn ContentRepositoryTrait,
    path: &str,
    node_type: &str,
    dimensions: &Dimensions,
) -> Result<Node> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(Error::Unexpected(format!("\"{}\" is not a node path", path)));
    }

    let mut current = Node::root();
    current.dimensions = dimensions.clone();
    for (index, segment) in segments.iter().enumerate() {
        let child_path = current.child_path(segment);
        current = match repository.get_by_path(&child_path, dimensions)? {
            Some(node) => node,
            None => {
                let child_type = if index + 1 == segments.len() {
                    node_type
                } else {
                    "unstructured"
                };
                let node = repository
                    .create_child(&current, NodeTemplate::new(child_type, *segment))
                    .await?;
                info!("Created {} ({})", node.context_path(), child_type);
                node
            }
        };
    }
    Ok(current)
}
