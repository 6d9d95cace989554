//! In-memory repositories shared by the unit tests of this crate.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::content::{dimensions_key, ContentRepositoryTrait, Dimensions, Node, NodeTemplate};
use crate::errors::{DatabaseError, Error, Result};
use crate::events::{AuditEvent, EventRepositoryTrait};
use crate::imports::{ImportRun, ImportRunRepositoryTrait};
use crate::record_mappings::{
    ImporterIdentity, NewRecordMapping, RecordMapping, RecordMappingRepositoryTrait,
};
use crate::utils::time_utils::now_utc;
use crate::vault::VaultRepositoryTrait;

#[derive(Clone, Default)]
pub struct InMemoryImportRunRepository {
    pub runs: Arc<Mutex<Vec<ImportRun>>>,
}

#[async_trait]
impl ImportRunRepositoryTrait for InMemoryImportRunRepository {
    async fn create(&self, run: ImportRun) -> Result<ImportRun> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(run)
    }

    async fn update(&self, run: ImportRun) -> Result<ImportRun> {
        let mut runs = self.runs.lock().unwrap();
        let existing = runs
            .iter_mut()
            .find(|r| r.id == run.id)
            .ok_or_else(|| DatabaseError::NotFound(run.id.clone()))?;
        *existing = run.clone();
        Ok(run)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<ImportRun>> {
        Ok(self.runs.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    fn find_by_external_run_id(&self, external_run_id: &str) -> Result<Option<ImportRun>> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.external_run_id.as_deref() == Some(external_run_id))
            .cloned())
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<ImportRun>> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    pub events: Arc<Mutex<Vec<AuditEvent>>>,
    /// Makes every `append` fail while set.
    pub fail_appends: Arc<AtomicBool>,
}

impl InMemoryEventRepository {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl EventRepositoryTrait for InMemoryEventRepository {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "event log unavailable".to_string(),
            )));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    fn list_for_import(&self, import_id: &str) -> Result<Vec<AuditEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.import_id == import_id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.events.lock().unwrap().len() as i64)
    }

    async fn remove_all(&self) -> Result<usize> {
        let mut events = self.events.lock().unwrap();
        let removed = events.len();
        events.clear();
        Ok(removed)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRecordMappingRepository {
    pub mappings: Arc<Mutex<Vec<RecordMapping>>>,
}

#[async_trait]
impl RecordMappingRepositoryTrait for InMemoryRecordMappingRepository {
    fn find(&self, identity: &ImporterIdentity, external_id: &str) -> Result<Option<RecordMapping>> {
        Ok(self
            .mappings
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.importer_identity_hash == identity.hash() && m.external_id == external_id)
            .cloned())
    }

    fn count_for_importer(&self, identity: &ImporterIdentity) -> Result<i64> {
        Ok(self
            .mappings
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.importer_identity_hash == identity.hash())
            .count() as i64)
    }

    async fn upsert(&self, mapping: NewRecordMapping) -> Result<RecordMapping> {
        let mut mappings = self.mappings.lock().unwrap();
        if let Some(existing) = mappings.iter_mut().find(|m| {
            m.importer_identity_hash == mapping.identity.hash()
                && m.external_id == mapping.external_id
        }) {
            existing.apply(&mapping);
            return Ok(existing.clone());
        }
        let record = mapping.into_record();
        mappings.push(record.clone());
        Ok(record)
    }

    async fn remove_all_for_importer(&self, identity: &ImporterIdentity) -> Result<usize> {
        let mut mappings = self.mappings.lock().unwrap();
        let before = mappings.len();
        mappings.retain(|m| m.importer_identity_hash != identity.hash());
        Ok(before - mappings.len())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryContentRepository {
    pub nodes: Arc<Mutex<Vec<Node>>>,
}

impl InMemoryContentRepository {
    /// Adds a node below the root without going through a parent.
    pub fn insert(&self, path: &str, node_type: &str) -> Node {
        let now = now_utc();
        let node = Node {
            identifier: uuid::Uuid::new_v4().to_string(),
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            node_type: node_type.to_string(),
            dimensions: Dimensions::new(),
            properties: Default::default(),
            created_at: now,
            updated_at: now,
        };
        self.nodes.lock().unwrap().push(node.clone());
        node
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentRepositoryTrait for InMemoryContentRepository {
    fn get_by_identifier(&self, identifier: &str, dimensions: &Dimensions) -> Result<Option<Node>> {
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.identifier == identifier && &n.dimensions == dimensions)
            .cloned())
    }

    fn get_by_path(&self, path: &str, dimensions: &Dimensions) -> Result<Option<Node>> {
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.path == path && &n.dimensions == dimensions)
            .cloned())
    }

    fn count_children(&self, parent: &Node) -> Result<i64> {
        let prefix = parent.child_path("");
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| {
                n.dimensions == parent.dimensions
                    && n.path.starts_with(&prefix)
                    && !n.path[prefix.len()..].contains('/')
            })
            .count() as i64)
    }

    async fn create_child(&self, parent: &Node, template: NodeTemplate) -> Result<Node> {
        let path = parent.child_path(&template.name);
        if self.get_by_path(&path, &parent.dimensions)?.is_some() {
            return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                "{}@{}",
                path,
                dimensions_key(&parent.dimensions)
            ))));
        }
        let now = now_utc();
        let node = Node {
            identifier: template
                .identifier
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            path,
            name: template.name,
            node_type: template.node_type,
            dimensions: parent.dimensions.clone(),
            properties: template.properties,
            created_at: now,
            updated_at: now,
        };
        self.nodes.lock().unwrap().push(node.clone());
        Ok(node)
    }

    async fn save_properties(&self, node: &Node) -> Result<Node> {
        let mut nodes = self.nodes.lock().unwrap();
        let existing = nodes
            .iter_mut()
            .find(|n| n.identifier == node.identifier && n.dimensions == node.dimensions)
            .ok_or_else(|| Error::NodeNotFound(node.identifier.clone()))?;
        existing.properties = node.properties.clone();
        existing.updated_at = now_utc();
        Ok(existing.clone())
    }

    async fn variant(&self, node: &Node, dimensions: &Dimensions) -> Result<Node> {
        if let Some(existing) = self.get_by_identifier(&node.identifier, dimensions)? {
            return Ok(existing);
        }
        let mut variant = node.clone();
        variant.dimensions = dimensions.clone();
        self.nodes.lock().unwrap().push(variant.clone());
        Ok(variant)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVaultRepository {
    pub entries: Arc<Mutex<HashMap<(String, String), Value>>>,
}

#[async_trait]
impl VaultRepositoryTrait for InMemoryVaultRepository {
    fn get(&self, preset: &str, key_hash: &str) -> Result<Option<Value>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(preset.to_string(), key_hash.to_string()))
            .cloned())
    }

    async fn set(&self, preset: &str, key_hash: &str, value: Value) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert((preset.to_string(), key_hash.to_string()), value);
        Ok(())
    }

    async fn flush(&self, preset: &str) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(p, _), _| p != preset);
        Ok(before - entries.len())
    }
}
