use async_trait::async_trait;

use super::{ImporterIdentity, NewRecordMapping, RecordMapping};
use crate::errors::Result;

/// Persistent checkpoint store, unique on (identity hash, external id).
#[async_trait]
pub trait RecordMappingRepositoryTrait: Send + Sync {
    fn find(&self, identity: &ImporterIdentity, external_id: &str) -> Result<Option<RecordMapping>>;

    fn count_for_importer(&self, identity: &ImporterIdentity) -> Result<i64>;

    /// Inserts the mapping or updates its mutable fields.
    ///
    /// `modified_at` only moves when one of `external_uri`, `node_id` or
    /// `node_path` actually changes.
    async fn upsert(&self, mapping: NewRecordMapping) -> Result<RecordMapping>;

    /// Removes every mapping of an importer identity. Returns the number of removed rows.
    async fn remove_all_for_importer(&self, identity: &ImporterIdentity) -> Result<usize>;
}
