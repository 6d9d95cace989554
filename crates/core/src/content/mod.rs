//! Content tree domain: nodes, node templates, node types and the
//! repository trait the importer writes through.

mod content_traits;
mod content_tree;
mod node_model;
mod node_types;

pub use content_traits::ContentRepositoryTrait;
pub use content_tree::ensure_path;
pub use node_model::{dimensions_key, Dimensions, Node, NodeTemplate, PropertyTarget, Properties};
pub use node_types::{NodeType, NodeTypeRegistry};
