//! Checkpoints: which external record became which node.

mod processed_node_service;
mod record_mapping_model;
mod record_mapping_traits;

pub use processed_node_service::ProcessedNodeService;
pub use record_mapping_model::{hash_value, ImporterIdentity, NewRecordMapping, RecordMapping};
pub use record_mapping_traits::RecordMappingRepositoryTrait;
