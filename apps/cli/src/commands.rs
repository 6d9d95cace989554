//! Command implementations. User facing output goes to stdout, logs to stderr.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use contentimport_core::batch::{
    run_batch_step, BatchOrchestrator, BatchReport, BatchRequest, InProcessStepExecutor,
    Registries, StepEnvironmentFactory, StepExecutor, StepRequest,
};
use contentimport_core::constants::RECENT_RUNS_LIMIT;
use contentimport_core::content::{ensure_path, Dimensions};
use contentimport_core::events::EventRepositoryTrait;
use contentimport_core::errors::ConfigurationError;
use contentimport_core::imports::ImportRunRepositoryTrait;
use contentimport_core::presets::PresetPartDefinition;
use contentimport_core::record_mappings::ProcessedNodeService;
use contentimport_core::settings::Settings;
use contentimport_core::vault::Vault;
use contentimport_storage_sqlite::SqliteEnvironmentFactory;

use crate::config::Config;
use crate::subprocess::SubprocessStepExecutor;

pub struct App {
    config: Config,
    factory: Arc<SqliteEnvironmentFactory>,
    registries: Arc<Registries>,
}

impl App {
    /// Prepares the database; settings are only read by commands that need them.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let factory = Arc::new(SqliteEnvironmentFactory::new(config.db_path.clone()));
        factory
            .migrate()
            .with_context(|| format!("Failed to prepare database {}", config.db_path))?;
        info!("Database path in use: {}", config.db_path);
        Ok(Self {
            config,
            factory,
            registries: Arc::new(Registries::default()),
        })
    }

    fn settings(&self) -> anyhow::Result<Arc<Settings>> {
        let settings = Settings::load(&self.config.settings_path)?;
        Ok(Arc::new(settings))
    }

    pub async fn batch(&self, request: BatchRequest, in_process: bool) -> anyhow::Result<()> {
        let settings = self.settings()?;
        let executor: Arc<dyn StepExecutor> = if in_process {
            Arc::new(InProcessStepExecutor::new(
                self.factory.clone(),
                settings.clone(),
                self.registries.clone(),
            ))
        } else {
            Arc::new(SubprocessStepExecutor::current_exe()?)
        };

        let env = self.factory.open()?;
        let mut orchestrator = BatchOrchestrator::new(
            settings,
            self.registries.clone(),
            Arc::new(env.import_service()),
            executor,
        );
        let report = orchestrator.run(&request).await?;
        print_report(&report);
        Ok(())
    }

    pub async fn execute_batch(&self, request: StepRequest) -> anyhow::Result<()> {
        let settings = self.settings()?;
        let env = self.factory.open()?;
        let count = run_batch_step(&env, settings, &self.registries, &request).await?;
        println!("{}", count);
        Ok(())
    }

    pub async fn init(&self, preset: &str, parts: Option<Vec<String>>) -> anyhow::Result<()> {
        let settings = self.settings()?;
        let preset_settings = settings.preset(preset)?;
        if let Some(selected) = &parts {
            for name in selected {
                settings.part(preset, name)?;
            }
        }

        let env = self.factory.open()?;
        let processed_nodes = env.processed_nodes();
        for part in &preset_settings.parts {
            let selected = parts
                .as_ref()
                .map_or(true, |names| names.iter().any(|n| n == &part.name));
            if !selected {
                continue;
            }
            let definition = PresetPartDefinition::new(preset, part, None, "")?;
            let identity = ProcessedNodeService::identity(definition.importer(), preset, &part.name);
            let removed = processed_nodes.reset(&identity).await?;
            println!(
                "{}: {} checkpoints removed ({})",
                definition.label(),
                removed,
                identity
            );
        }

        let flushed = Vault::new(preset, env.vault.clone()).flush().await?;
        println!("Vault of \"{}\" flushed, {} entries removed", preset, flushed);
        Ok(())
    }

    pub fn show(&self, preset: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        let preset_settings = settings.preset(preset)?;
        if preset_settings.parts.is_empty() {
            return Err(ConfigurationError::MissingParts(preset.to_string()).into());
        }

        let env = self.factory.open()?;
        let processed_nodes = env.processed_nodes();
        println!("Preset \"{}\"", preset);
        for part in &preset_settings.parts {
            let definition = PresetPartDefinition::new(preset, part, None, "")?;
            let identity = ProcessedNodeService::identity(definition.importer(), preset, &part.name);
            let checkpoints = processed_nodes.count(&identity)?;
            println!(
                "  {} ({}): provider {}, importer {}, batch size {}, {} checkpoints",
                definition.label(),
                part.name,
                definition.data_provider(),
                definition.importer(),
                definition
                    .batch_size()
                    .map_or_else(|| "-".to_string(), |size| size.to_string()),
                checkpoints
            );
        }

        let runs = env.import_runs.list_recent(RECENT_RUNS_LIMIT)?;
        if runs.is_empty() {
            println!("No import runs yet");
        } else {
            println!("Recent import runs");
        }
        for run in runs {
            println!(
                "  {} started {}, {}{}",
                run.id,
                run.started_at.to_rfc3339(),
                match (run.ended_at, run.elapsed_seconds()) {
                    (Some(ended), Some(seconds)) =>
                        format!("ended {} ({}s)", ended.to_rfc3339(), seconds),
                    _ => "still open".to_string(),
                },
                run.external_run_id
                    .as_ref()
                    .map(|id| format!(", external id {}", id))
                    .unwrap_or_default()
            );
        }
        Ok(())
    }

    pub async fn flush_event_log(&self) -> anyhow::Result<()> {
        let env = self.factory.open()?;
        let removed = env.events.remove_all().await?;
        println!("Event log flushed, {} events removed", removed);
        Ok(())
    }

    pub async fn create_site(&self, path: &str, node_type: &str) -> anyhow::Result<()> {
        let env = self.factory.open()?;
        let node = ensure_path(env.content.as_ref(), path, node_type, &Dimensions::new()).await?;
        println!("{} ({}) {}", node.path, node.node_type, node.identifier);
        Ok(())
    }
}

fn print_report(report: &BatchReport) {
    println!("Import {}", report.import_id);
    for part in &report.parts {
        if part.skipped {
            println!("  {} skipped", part.label);
        } else {
            println!(
                "  {}: {} records in {} steps ({}ms)",
                part.label, part.records, part.steps, part.elapsed_ms
            );
        }
    }
    println!(
        "{} records in {}s",
        report.total_records(),
        report.elapsed_seconds.unwrap_or_default()
    );
}
