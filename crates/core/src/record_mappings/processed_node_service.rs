use std::sync::Arc;

use super::{ImporterIdentity, RecordMapping, RecordMappingRepositoryTrait};
use crate::errors::Result;
use crate::imports::ImportService;

/// Answers "has this external record been turned into a node already?"
pub struct ProcessedNodeService {
    repository: Arc<dyn RecordMappingRepositoryTrait>,
    import_service: Arc<ImportService>,
}

impl ProcessedNodeService {
    pub fn new(
        repository: Arc<dyn RecordMappingRepositoryTrait>,
        import_service: Arc<ImportService>,
    ) -> Self {
        Self {
            repository,
            import_service,
        }
    }

    pub fn identity(importer: &str, preset: &str, part: &str) -> ImporterIdentity {
        ImporterIdentity::new(importer, preset, part)
    }

    pub fn get(&self, identity: &ImporterIdentity, external_id: &str) -> Result<Option<RecordMapping>> {
        self.repository.find(identity, external_id)
    }

    /// Records the checkpoint through the import session so it is audited.
    pub async fn set(
        &self,
        identity: &ImporterIdentity,
        external_id: &str,
        external_uri: Option<&str>,
        node_id: &str,
        node_path: &str,
    ) -> Result<RecordMapping> {
        self.import_service
            .add_or_update_record_mapping(identity, external_id, external_uri, node_id, node_path)
            .await
    }

    pub fn count(&self, identity: &ImporterIdentity) -> Result<i64> {
        self.repository.count_for_importer(identity)
    }

    pub async fn reset(&self, identity: &ImporterIdentity) -> Result<usize> {
        self.repository.remove_all_for_importer(identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        InMemoryEventRepository, InMemoryImportRunRepository, InMemoryRecordMappingRepository,
    };

    fn service() -> (ProcessedNodeService, Arc<ImportService>) {
        let mappings = Arc::new(InMemoryRecordMappingRepository::default());
        let import_service = Arc::new(ImportService::new(
            Arc::new(InMemoryImportRunRepository::default()),
            Arc::new(InMemoryEventRepository::default()),
            mappings.clone(),
        ));
        (
            ProcessedNodeService::new(mappings, import_service.clone()),
            import_service,
        )
    }

    #[tokio::test]
    async fn test_checkpoints_are_counted_and_reset_per_identity() {
        let (processed_nodes, import_service) = service();
        let persons = ProcessedNodeService::identity("node", "people", "persons");
        let teams = ProcessedNodeService::identity("node", "people", "teams");
        import_service.start(None, false).await.unwrap();

        processed_nodes
            .set(&persons, "1", None, "n-1", "/sites/demo/storage/n-1")
            .await
            .unwrap();
        processed_nodes
            .set(&persons, "2", None, "n-2", "/sites/demo/storage/n-2")
            .await
            .unwrap();
        processed_nodes
            .set(&teams, "1", None, "t-1", "/sites/demo/storage/t-1")
            .await
            .unwrap();

        assert_eq!(processed_nodes.get(&persons, "2").unwrap().unwrap().node_id, "n-2");
        assert_eq!(processed_nodes.count(&persons).unwrap(), 2);

        assert_eq!(processed_nodes.reset(&persons).await.unwrap(), 2);
        assert_eq!(processed_nodes.count(&persons).unwrap(), 0);
        assert!(processed_nodes.get(&persons, "1").unwrap().is_none());
        assert_eq!(processed_nodes.count(&teams).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_requires_a_running_import() {
        let (processed_nodes, _) = service();
        let persons = ProcessedNodeService::identity("node", "people", "persons");

        assert!(processed_nodes
            .set(&persons, "1", None, "n-1", "/sites/demo/storage/n-1")
            .await
            .is_err());
        assert_eq!(processed_nodes.count(&persons).unwrap(), 0);
    }
}
