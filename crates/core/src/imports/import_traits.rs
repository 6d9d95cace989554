use async_trait::async_trait;

use super::ImportRun;
use crate::errors::Result;

/// Repository trait for import runs.
#[async_trait]
pub trait ImportRunRepositoryTrait: Send + Sync {
    async fn create(&self, run: ImportRun) -> Result<ImportRun>;

    async fn update(&self, run: ImportRun) -> Result<ImportRun>;

    fn get_by_id(&self, id: &str) -> Result<Option<ImportRun>>;

    /// Most recent run that used the given external run id.
    fn find_by_external_run_id(&self, external_run_id: &str) -> Result<Option<ImportRun>>;

    /// Runs ordered by start time, newest first.
    fn list_recent(&self, limit: i64) -> Result<Vec<ImportRun>>;
}
