use log::{debug, error, info};
use serde_json::{json, Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ImportRun, ImportRunRepositoryTrait};
use crate::constants::{EVENT_MESSAGE_KEY, EVENT_SEVERITY_KEY};
use crate::errors::{Error, ImportError, Result};
use crate::events::{AuditEvent, EventRepositoryTrait, Severity};
use crate::record_mappings::{
    ImporterIdentity, NewRecordMapping, RecordMapping, RecordMappingRepositoryTrait,
};

#[derive(Debug, Default)]
struct SessionState {
    current: Option<ImportRun>,
    last: Option<ImportRun>,
}

/// The import session: owns the currently attached run and writes audit
/// events and checkpoints on its behalf.
pub struct ImportService {
    runs: Arc<dyn ImportRunRepositoryTrait>,
    events: Arc<dyn EventRepositoryTrait>,
    record_mappings: Arc<dyn RecordMappingRepositoryTrait>,
    state: RwLock<SessionState>,
}

impl ImportService {
    pub fn new(
        runs: Arc<dyn ImportRunRepositoryTrait>,
        events: Arc<dyn EventRepositoryTrait>,
        record_mappings: Arc<dyn RecordMappingRepositoryTrait>,
    ) -> Self {
        Self {
            runs,
            events,
            record_mappings,
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, SessionState>> {
        self.state
            .read()
            .map_err(|_| Error::Unexpected("import session state is poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, SessionState>> {
        self.state
            .write()
            .map_err(|_| Error::Unexpected("import session state is poisoned".to_string()))
    }

    /// Opens a new run.
    ///
    /// A previously used `external_run_id` is rejected unless `force` is set,
    /// in which case a notice event records the forced re-import.
    pub async fn start(&self, external_run_id: Option<&str>, force: bool) -> Result<ImportRun> {
        if self.read_state()?.current.is_some() {
            return Err(ImportError::AlreadyRunning.into());
        }

        let mut forced = false;
        if let Some(external_id) = external_run_id {
            if let Some(existing) = self.runs.find_by_external_run_id(external_id)? {
                if !force {
                    return Err(ImportError::DuplicateRun {
                        external_run_id: external_id.to_string(),
                        started_at: existing.started_at,
                    }
                    .into());
                }
                forced = true;
            }
        }

        let run = self.runs.create(ImportRun::new(external_run_id)).await?;
        {
            let mut state = self.write_state()?;
            if state.current.is_some() {
                return Err(ImportError::AlreadyRunning.into());
            }
            state.current = Some(run.clone());
        }
        info!("Import {} started", run.id);

        if let Err(err) = self.record_start(external_run_id, forced).await {
            // the run exists but never got going, close it again
            error!("Import {} could not be started: {}", run.id, err);
            let mut closed = self.current()?;
            if closed.end().is_ok() {
                if let Err(e) = self.finish(closed).await {
                    error!("Failed to close import {}: {}", run.id, e);
                }
            }
            return Err(err);
        }

        Ok(run)
    }

    async fn record_start(&self, external_run_id: Option<&str>, forced: bool) -> Result<()> {
        self.add_event("Import.Started", None, None, None).await?;
        if forced {
            self.add_event_message(
                "ImportService:start",
                &format!(
                    "Forcing re-import of data set with external identifier \"{}\".",
                    external_run_id.unwrap_or_default()
                ),
                Severity::Notice,
                None,
            )
            .await?;
        }
        Ok(())
    }

    /// Closes the current run and keeps it as the last completed one.
    ///
    /// The run is closed even when `Import.Ended` cannot be recorded; that
    /// error is returned afterwards.
    pub async fn stop(&self) -> Result<ImportRun> {
        let mut run = self.current()?;
        run.end()?;
        let recorded = self.add_event("Import.Ended", None, None, None).await;
        let run = self.finish(run).await?;
        recorded?;
        Ok(run)
    }

    /// Closes the current run after a fatal failure.
    pub async fn abort(&self, reason: &str) -> Result<ImportRun> {
        let mut run = self.current()?;
        run.end()?;
        let recorded = self
            .add_event_message(
                "Import.Aborted",
                &format!("Import aborted: {}", reason),
                Severity::Error,
                None,
            )
            .await;
        let run = self.finish(run).await?;
        recorded?;
        Ok(run)
    }

    /// Detaches the run from the session, then persists its end time.
    async fn finish(&self, run: ImportRun) -> Result<ImportRun> {
        self.write_state()?.current = None;
        let run = self.runs.update(run).await?;
        let mut state = self.write_state()?;
        state.last = Some(run.clone());
        debug!(
            "Import {} closed after {}s",
            run.id,
            run.elapsed_seconds().unwrap_or_default()
        );
        Ok(run)
    }

    /// Reattaches the session to an existing run, as a batch step does.
    pub fn resume(&self, run_id: &str) -> Result<ImportRun> {
        let mut state = self.write_state()?;
        if state.current.is_some() {
            return Err(ImportError::AlreadyRunning.into());
        }
        let run = self
            .runs
            .get_by_id(run_id)?
            .ok_or_else(|| ImportError::RunNotFound(run_id.to_string()))?;
        state.current = Some(run.clone());
        Ok(run)
    }

    /// Appends an audit event to the current run.
    ///
    /// Events carrying a message are written to the log as well.
    pub async fn add_event(
        &self,
        event_type: &str,
        external_id: Option<&str>,
        data: Option<Map<String, Value>>,
        parent: Option<&AuditEvent>,
    ) -> Result<AuditEvent> {
        let import_id = self.current_id()?;
        let data = data.unwrap_or_default();
        let severity = data
            .get(EVENT_SEVERITY_KEY)
            .and_then(Value::as_i64)
            .map(|s| Severity::from_i32(s as i32))
            .unwrap_or_default();

        if let Some(message) = data.get(EVENT_MESSAGE_KEY).and_then(Value::as_str) {
            if parent.is_some() {
                log::log!(severity.log_level(), "- {}", message);
            } else {
                log::log!(severity.log_level(), "{}", message);
            }
        }

        let event = AuditEvent::new(&import_id, event_type, external_id, data, severity, parent);
        self.events.append(event).await
    }

    pub async fn add_event_message(
        &self,
        event_type: &str,
        message: &str,
        severity: Severity,
        parent: Option<&AuditEvent>,
    ) -> Result<AuditEvent> {
        let mut data = Map::new();
        data.insert(EVENT_MESSAGE_KEY.to_string(), json!(message));
        data.insert(EVENT_SEVERITY_KEY.to_string(), json!(severity.as_i32()));
        self.add_event(event_type, None, Some(data), parent).await
    }

    /// Upserts a checkpoint and audits it as `<Importer>:Record:Ended`.
    pub async fn add_or_update_record_mapping(
        &self,
        identity: &ImporterIdentity,
        external_id: &str,
        external_uri: Option<&str>,
        node_id: &str,
        node_path: &str,
    ) -> Result<RecordMapping> {
        // checkpoints are only written inside a run
        self.current_id()?;

        let mapping = self
            .record_mappings
            .upsert(NewRecordMapping {
                identity: identity.clone(),
                external_id: external_id.to_string(),
                external_uri: external_uri.map(str::to_string),
                node_id: node_id.to_string(),
                node_path: node_path.to_string(),
            })
            .await?;

        let mut data = Map::new();
        data.insert("importer".to_string(), json!(identity.value()));
        data.insert("externalIdentifier".to_string(), json!(external_id));
        data.insert("externalUri".to_string(), json!(external_uri));
        data.insert("nodeIdentifier".to_string(), json!(node_id));
        data.insert("nodePath".to_string(), json!(node_path));
        self.add_event(
            &format!("{}:Record:Ended", identity.short_name()),
            Some(external_id),
            Some(data),
            None,
        )
        .await?;

        Ok(mapping)
    }

    pub fn current(&self) -> Result<ImportRun> {
        self.read_state()?
            .current
            .clone()
            .ok_or_else(|| ImportError::NotRunning.into())
    }

    pub fn current_id(&self) -> Result<String> {
        self.read_state()?
            .current
            .as_ref()
            .map(|run| run.id.clone())
            .ok_or_else(|| ImportError::NotRunning.into())
    }

    pub fn last(&self) -> Result<ImportRun> {
        self.read_state()?
            .last
            .clone()
            .ok_or_else(|| ImportError::LastImportNotSet.into())
    }

    pub fn is_running(&self) -> bool {
        self.read_state()
            .map(|state| state.current.is_some())
            .unwrap_or(false)
    }
}
