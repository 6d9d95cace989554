use std::sync::Arc;

use crate::content::{ContentRepositoryTrait, NodeTypeRegistry};
use crate::data_types::DataTypeConverter;
use crate::errors::Result;
use crate::events::{AuditEvent, Severity};
use crate::imports::ImportService;
use crate::mapping::{DimensionsImporter, NodePropertyMapper};
use crate::record_mappings::{ImporterIdentity, ProcessedNodeService, RecordMappingRepositoryTrait};
use crate::settings::Settings;
use crate::vault::Vault;

/// Collaborators of an importer for one batch step.
#[derive(Clone)]
pub struct ImporterContext {
    pub preset: String,
    pub part: String,
    pub settings: Arc<Settings>,
    pub import_service: Arc<ImportService>,
    pub processed_nodes: Arc<ProcessedNodeService>,
    pub content: Arc<dyn ContentRepositoryTrait>,
    pub node_types: Arc<NodeTypeRegistry>,
    pub mapper: Arc<NodePropertyMapper>,
    pub dimensions: Arc<DimensionsImporter>,
    pub data_types: Arc<DataTypeConverter>,
    pub vault: Vault,
}

impl ImporterContext {
    /// Wires the mapping services for one preset part from the settings.
    pub fn assemble(
        preset: &str,
        part: &str,
        settings: Arc<Settings>,
        import_service: Arc<ImportService>,
        record_mappings: Arc<dyn RecordMappingRepositoryTrait>,
        content: Arc<dyn ContentRepositoryTrait>,
        vault: Vault,
    ) -> Result<Self> {
        let node_types = Arc::new(NodeTypeRegistry::from_settings(&settings.node_types));
        let mapper = Arc::new(NodePropertyMapper::new(
            import_service.clone(),
            node_types.clone(),
            settings.property_comparison,
            settings.record_log_enabled,
        ));
        let dimensions = Arc::new(DimensionsImporter::new(
            content.clone(),
            mapper.clone(),
            node_types.clone(),
            settings.dimensions.clone(),
        ));
        let data_types = Arc::new(DataTypeConverter::new(&settings.data_types)?);
        let processed_nodes = Arc::new(ProcessedNodeService::new(
            record_mappings,
            import_service.clone(),
        ));

        Ok(Self {
            preset: preset.to_string(),
            part: part.to_string(),
            settings,
            import_service,
            processed_nodes,
            content,
            node_types,
            mapper,
            dimensions,
            data_types,
            vault,
        })
    }

    /// Checkpoint identity of an importer type within this preset part.
    pub fn identity(&self, importer: &str) -> ImporterIdentity {
        ProcessedNodeService::identity(importer, &self.preset, &self.part)
    }

    /// Records a `Record:Import:Log:<Severity>` event.
    pub async fn log(
        &self,
        message: &str,
        severity: Severity,
        event: Option<&AuditEvent>,
    ) -> Result<AuditEvent> {
        self.import_service
            .add_event_message(
                &format!("Record:Import:Log:{}", severity.label()),
                message,
                severity,
                event,
            )
            .await
    }
}
