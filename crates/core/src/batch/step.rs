use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::content::ContentRepositoryTrait;
use crate::data_providers::{DataProviderRegistry, ProviderContext, ProviderRequest};
use crate::errors::Result;
use crate::events::{EventRepositoryTrait, Severity};
use crate::importers::{process_records, ImporterContext, ImporterRegistry};
use crate::imports::{ImportRunRepositoryTrait, ImportService};
use crate::record_mappings::{ProcessedNodeService, RecordMappingRepositoryTrait};
use crate::settings::Settings;
use crate::vault::{Vault, VaultRepositoryTrait};

/// Arguments of one bounded import step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub preset: String,
    pub part: String,
    pub data_provider: String,
    pub importer: String,
    pub import_id: String,
    pub offset: Option<usize>,
    pub batch_size: Option<usize>,
    pub current_batch: usize,
    pub log_prefix: String,
}

impl StepRequest {
    /// Command line of the hidden `execute-batch` command.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "execute-batch".to_string(),
            "--preset".to_string(),
            self.preset.clone(),
            "--part".to_string(),
            self.part.clone(),
            "--data-provider".to_string(),
            self.data_provider.clone(),
            "--importer".to_string(),
            self.importer.clone(),
            "--import-id".to_string(),
            self.import_id.clone(),
            "--current-batch".to_string(),
            self.current_batch.to_string(),
        ];
        if let Some(offset) = self.offset {
            args.push("--offset".to_string());
            args.push(offset.to_string());
        }
        if let Some(batch_size) = self.batch_size {
            args.push("--batch-size".to_string());
            args.push(batch_size.to_string());
        }
        if !self.log_prefix.is_empty() {
            args.push("--log-prefix".to_string());
            args.push(self.log_prefix.clone());
        }
        args
    }
}

/// Repositories used by one step. Dropped when the step ends.
#[derive(Clone)]
pub struct StepEnvironment {
    pub import_runs: Arc<dyn ImportRunRepositoryTrait>,
    pub events: Arc<dyn EventRepositoryTrait>,
    pub record_mappings: Arc<dyn RecordMappingRepositoryTrait>,
    pub content: Arc<dyn ContentRepositoryTrait>,
    pub vault: Arc<dyn VaultRepositoryTrait>,
}

impl StepEnvironment {
    /// A fresh import session over this environment's repositories.
    pub fn import_service(&self) -> ImportService {
        ImportService::new(
            self.import_runs.clone(),
            self.events.clone(),
            self.record_mappings.clone(),
        )
    }

    /// Checkpoint access for commands that work outside a run.
    pub fn processed_nodes(&self) -> ProcessedNodeService {
        ProcessedNodeService::new(
            self.record_mappings.clone(),
            Arc::new(self.import_service()),
        )
    }
}

/// Opens a new environment, with fresh connections, for every step.
pub trait StepEnvironmentFactory: Send + Sync {
    fn open(&self) -> Result<StepEnvironment>;
}

/// Provider and importer types available to a run.
#[derive(Default)]
pub struct Registries {
    pub providers: DataProviderRegistry,
    pub importers: ImporterRegistry,
}

/// Runs one step: resumes the run, imports the window and returns the
/// number of processed records.
pub async fn run_batch_step(
    env: &StepEnvironment,
    settings: Arc<Settings>,
    registries: &Registries,
    request: &StepRequest,
) -> Result<usize> {
    let import_service = Arc::new(env.import_service());
    import_service.resume(&request.import_id)?;

    let part = settings.part(&request.preset, &request.part)?;
    let vault = Vault::new(&request.preset, env.vault.clone());

    let mut provider = registries.providers.create(
        &request.data_provider,
        ProviderRequest {
            options: &part.data_provider_options,
            offset: request.offset,
            limit: request.batch_size,
            context: ProviderContext {
                preset: request.preset.clone(),
                part: request.part.clone(),
                settings: settings.clone(),
                vault: vault.clone(),
            },
        },
    )?;

    let context = ImporterContext::assemble(
        &request.preset,
        &request.part,
        settings.clone(),
        import_service.clone(),
        env.record_mappings.clone(),
        env.content.clone(),
        vault,
    )?;
    let mut importer = registries
        .importers
        .create(&request.importer, &part.importer_options, context)?;

    import_service
        .add_event_message(
            &format!("{}:Batch:Started", importer.name()),
            &format!(
                "{} batch started ({})",
                request.importer, request.data_provider
            ),
            Severity::Info,
            None,
        )
        .await?;

    importer.initialize().await?;
    let records = provider.fetch()?;
    debug!(
        "{} batch #{} fetched {} records (offset {:?}, limit {:?})",
        request.log_prefix,
        request.current_batch,
        records.len(),
        request.offset,
        request.batch_size
    );

    let count = process_records(importer.as_mut(), records, &import_service).await?;

    import_service
        .add_event_message(
            &format!("{}:Batch:Ended", importer.name()),
            &format!("{} batch ended, {} records processed", request.importer, count),
            Severity::Info,
            None,
        )
        .await?;

    Ok(count)
}

/// Executes one step and reports its record count.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, request: &StepRequest) -> Result<usize>;
}

/// Runs steps in the current process, each in a freshly opened environment.
pub struct InProcessStepExecutor {
    factory: Arc<dyn StepEnvironmentFactory>,
    settings: Arc<Settings>,
    registries: Arc<Registries>,
}

impl InProcessStepExecutor {
    pub fn new(
        factory: Arc<dyn StepEnvironmentFactory>,
        settings: Arc<Settings>,
        registries: Arc<Registries>,
    ) -> Self {
        Self {
            factory,
            settings,
            registries,
        }
    }
}

#[async_trait]
impl StepExecutor for InProcessStepExecutor {
    async fn execute(&self, request: &StepRequest) -> Result<usize> {
        let env = self.factory.open()?;
        let count = run_batch_step(&env, self.settings.clone(), &self.registries, request).await;
        drop(env);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_carry_the_window_only_when_batched() {
        let mut request = StepRequest {
            preset: "people".to_string(),
            part: "persons".to_string(),
            data_provider: "csv".to_string(),
            importer: "node".to_string(),
            import_id: "run-1".to_string(),
            offset: Some(4),
            batch_size: Some(2),
            current_batch: 3,
            log_prefix: String::new(),
        };
        let args = request.to_args();
        assert_eq!(args[0], "execute-batch");
        assert!(args.windows(2).any(|w| w == ["--offset", "4"]));
        assert!(args.windows(2).any(|w| w == ["--batch-size", "2"]));
        assert!(!args.contains(&"--log-prefix".to_string()));

        request.offset = None;
        request.batch_size = None;
        let args = request.to_args();
        assert!(!args.contains(&"--offset".to_string()));
        assert!(!args.contains(&"--batch-size".to_string()));
    }
}
