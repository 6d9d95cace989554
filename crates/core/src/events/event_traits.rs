use async_trait::async_trait;

use super::AuditEvent;
use crate::errors::Result;

/// Append-only store for audit events.
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent>;

    fn list_for_import(&self, import_id: &str) -> Result<Vec<AuditEvent>>;

    fn count(&self) -> Result<i64>;

    /// Deletes every stored event. Returns the number of removed rows.
    async fn remove_all(&self) -> Result<usize>;
}
