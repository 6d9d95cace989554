//! Batch orchestrator.
//!
//! Runs every selected part of a preset as a sequence of bounded steps and
//! owns the import run for the whole invocation.
//!
//! ```text
//! BatchOrchestrator
//!       │
//!       ├─► ImportService (start / stop / abort the run)
//!       └─► StepExecutor  (one step per window, fresh environment each)
//!                │
//!                └─► run_batch_step ─► DataProvider ─► Importer
//! ```

use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

use super::{BatchReport, PartReport, Registries, StepExecutor};
use crate::errors::{ConfigurationError, Error, ImportError, Result};
use crate::events::Severity;
use crate::imports::ImportService;
use crate::presets::PresetPartDefinition;
use crate::settings::Settings;

/// What to import.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub preset: String,
    /// Restricts the run to these parts; all parts when `None`
    pub parts: Option<Vec<String>>,
    /// Overrides the batch size of every part
    pub batch_size: Option<usize>,
    pub external_run_id: Option<String>,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Stopped,
    Aborted,
}

enum PlannedPart {
    Import(PresetPartDefinition),
    Skip { part: String, label: String },
}

/// Drives one batch run. Single use: a stopped or aborted orchestrator
/// never runs again.
pub struct BatchOrchestrator {
    settings: Arc<Settings>,
    registries: Arc<Registries>,
    import_service: Arc<ImportService>,
    executor: Arc<dyn StepExecutor>,
    state: RunState,
}

impl BatchOrchestrator {
    pub fn new(
        settings: Arc<Settings>,
        registries: Arc<Registries>,
        import_service: Arc<ImportService>,
        executor: Arc<dyn StepExecutor>,
    ) -> Self {
        Self {
            settings,
            registries,
            import_service,
            executor,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub async fn run(&mut self, request: &BatchRequest) -> Result<BatchReport> {
        match self.state {
            RunState::NotStarted => {}
            RunState::Running => return Err(ImportError::AlreadyRunning.into()),
            RunState::Stopped | RunState::Aborted => return Err(ImportError::AlreadyEnded.into()),
        }

        let plan = self.plan(request)?;

        let run = self
            .import_service
            .start(request.external_run_id.as_deref(), request.force)
            .await?;
        self.state = RunState::Running;
        info!("Import {} started for preset \"{}\"", run.id, request.preset);

        let mut parts = Vec::with_capacity(plan.len());
        for planned in plan {
            let definition = match planned {
                PlannedPart::Skip { part, label } => {
                    info!("Skipping {} ({})", label, part);
                    parts.push(PartReport::skipped(&part, &label));
                    continue;
                }
                PlannedPart::Import(definition) => definition.with_log_prefix(&run.id),
            };

            let event_type = definition.event_type();
            match self.import_part(definition, &run.id).await {
                Ok(report) => parts.push(report),
                Err(err) => {
                    error!("{}", err);
                    self.fail(&event_type, &err).await;
                    return Err(err);
                }
            }
        }

        let run = match self.import_service.stop().await {
            Ok(run) => run,
            Err(err) => {
                error!("Failed to close import {}: {}", run.id, err);
                self.state = RunState::Aborted;
                return Err(err);
            }
        };
        self.state = RunState::Stopped;
        let report = BatchReport {
            import_id: run.id.clone(),
            started_at: run.started_at,
            ended_at: run.ended_at,
            elapsed_seconds: run.elapsed_seconds(),
            parts,
        };
        info!(
            "Import {} finished: {} records in {} steps, {}s",
            report.import_id,
            report.total_records(),
            report.total_steps(),
            report.elapsed_seconds.unwrap_or_default()
        );
        Ok(report)
    }

    /// Validates the whole preset before anything is written.
    fn plan(&self, request: &BatchRequest) -> Result<Vec<PlannedPart>> {
        let preset = self.settings.preset(&request.preset)?;

        if let Some(selected) = &request.parts {
            for name in selected {
                if !preset.parts.iter().any(|p| &p.name == name) {
                    return Err(ConfigurationError::PartNotFound {
                        preset: request.preset.clone(),
                        part: name.clone(),
                    }
                    .into());
                }
            }
        }

        let mut plan = Vec::with_capacity(preset.parts.len());
        for part in &preset.parts {
            let definition =
                PresetPartDefinition::new(&request.preset, part, request.batch_size, "")?;
            if !self.registries.providers.contains(definition.data_provider()) {
                return Err(ConfigurationError::UnknownDataProvider(
                    definition.data_provider().to_string(),
                )
                .into());
            }
            if !self.registries.importers.contains(definition.importer()) {
                return Err(
                    ConfigurationError::UnknownImporter(definition.importer().to_string()).into(),
                );
            }

            let selected = request
                .parts
                .as_ref()
                .map_or(true, |names| names.iter().any(|n| n == &part.name));
            if selected {
                plan.push(PlannedPart::Import(definition));
            } else {
                plan.push(PlannedPart::Skip {
                    part: part.name.clone(),
                    label: definition.label().to_string(),
                });
            }
        }
        Ok(plan)
    }

    async fn import_part(
        &self,
        mut definition: PresetPartDefinition,
        import_id: &str,
    ) -> Result<PartReport> {
        let event_type = definition.event_type();
        self.import_service
            .add_event_message(
                &format!("{}:Started", event_type),
                &format!("Start importing {}", definition.label()),
                Severity::Info,
                None,
            )
            .await?;

        let started = Instant::now();
        let mut steps = 0usize;
        let mut records = 0usize;
        loop {
            let step_started = Instant::now();
            let count = self
                .executor
                .execute(&definition.step_request(import_id))
                .await?;
            let elapsed_ms = step_started.elapsed().as_millis();
            steps += 1;
            records += count;

            let per_record = if count > 0 {
                elapsed_ms as f64 / count as f64
            } else {
                0.0
            };
            let average = started.elapsed().as_millis() as f64 / steps as f64;
            info!(
                "{} #{} {} records in {}ms, {:.2} ms per record, {:.2} ms per batch (avg)",
                definition.label(),
                definition.current_batch(),
                count,
                elapsed_ms,
                per_record,
                average
            );

            let exhausted = match definition.batch_size() {
                Some(size) => count == 0 || count < size,
                None => true,
            };
            if !definition.is_batched() || exhausted {
                break;
            }
            definition.next_batch();
        }

        let elapsed_ms = started.elapsed().as_millis();
        self.import_service
            .add_event_message(
                &format!("{}:Ended", event_type),
                &format!(
                    "{} done, {} records in {} steps ({}ms)",
                    definition.label(),
                    records,
                    steps,
                    elapsed_ms
                ),
                Severity::Info,
                None,
            )
            .await?;

        Ok(PartReport {
            part: definition.part().to_string(),
            label: definition.label().to_string(),
            skipped: false,
            steps,
            records,
            elapsed_ms,
        })
    }

    /// Records the failure and closes the run. Errors while doing so are
    /// only logged; the step error is what the caller sees.
    async fn fail(&mut self, event_type: &str, err: &Error) {
        if let Err(e) = self
            .import_service
            .add_event_message(
                &format!("{}:Failed", event_type),
                &err.to_string(),
                Severity::Error,
                None,
            )
            .await
        {
            error!("Failed to record failure event: {}", e);
        }
        if let Err(e) = self.import_service.abort(&err.to_string()).await {
            error!("Failed to abort import: {}", e);
        }
        self.state = RunState::Aborted;
    }
}
