use crate::batch::StepRequest;
use crate::errors::{Error, Result};
use crate::settings::PartSettings;

/// One part of a preset as seen by the batch loop.
///
/// Rebuilt on every invocation from settings; only the offset and batch
/// counter move while the part is imported.
#[derive(Debug, Clone)]
pub struct PresetPartDefinition {
    preset: String,
    part: String,
    label: String,
    data_provider: String,
    importer: String,
    batch_size: Option<usize>,
    offset: Option<usize>,
    current_batch: usize,
    debug: bool,
    log_prefix: String,
}

impl PresetPartDefinition {
    /// Builds a definition, applying a command line batch size override.
    pub fn new(
        preset: &str,
        settings: &PartSettings,
        batch_size_override: Option<usize>,
        log_prefix: &str,
    ) -> Result<Self> {
        let context = format!("preset part \"{}/{}\" settings", preset, settings.name);
        let label = required(&settings.label, "label", &context)?;
        let data_provider = required(&settings.data_provider, "data_provider", &context)?;
        let importer = required(&settings.importer, "importer", &context)?;

        let batch_size = batch_size_override
            .or(settings.batch_size)
            .filter(|size| *size > 0);

        Ok(Self {
            preset: preset.to_string(),
            part: settings.name.clone(),
            label,
            data_provider,
            importer,
            batch_size,
            offset: batch_size.map(|_| 0),
            current_batch: 1,
            debug: settings.debug,
            log_prefix: log_prefix.to_string(),
        })
    }

    /// Replaces the log prefix once the run id is known.
    pub fn with_log_prefix(mut self, log_prefix: &str) -> Self {
        self.log_prefix = log_prefix.to_string();
        self
    }

    /// Moves to the next batch window.
    pub fn next_batch(&mut self) {
        self.current_batch += 1;
        if let (Some(offset), Some(size)) = (self.offset.as_mut(), self.batch_size) {
            *offset += size;
        }
    }

    /// True when the part is imported in several bounded steps.
    pub fn is_batched(&self) -> bool {
        self.batch_size.is_some() && !self.debug
    }

    /// Prefix of the `Started`/`Ended`/`Failed` audit events of this part.
    pub fn event_type(&self) -> String {
        format!("Preset:{}:{}", self.preset, self.part)
    }

    pub fn step_request(&self, import_id: &str) -> StepRequest {
        StepRequest {
            preset: self.preset.clone(),
            part: self.part.clone(),
            data_provider: self.data_provider.clone(),
            importer: self.importer.clone(),
            import_id: import_id.to_string(),
            offset: self.offset,
            batch_size: self.batch_size,
            current_batch: self.current_batch,
            log_prefix: self.log_prefix.clone(),
        }
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data_provider(&self) -> &str {
        &self.data_provider
    }

    pub fn importer(&self) -> &str {
        &self.importer
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn current_batch(&self) -> usize {
        self.current_batch
    }
}

fn required(value: &Option<String>, option: &str, context: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::missing_option(option, context)),
    }
}
