//! Record mapping domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::utils::time_utils::now_utc;

/// SHA-256 hex digest used for indexed lookups of long strings.
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity of an importer within a preset part, `<importer>@<preset>/<part>`.
///
/// The same external id imported by two parts yields two distinct checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImporterIdentity {
    value: String,
    hash: String,
}

impl ImporterIdentity {
    pub fn new(importer: &str, preset: &str, part: &str) -> Self {
        Self::from_value(format!("{}@{}/{}", importer, preset, part))
    }

    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let hash = hash_value(&value);
        Self { value, hash }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Importer part of the identity, used as event type prefix.
    pub fn short_name(&self) -> &str {
        self.value.split('@').next().unwrap_or(&self.value)
    }
}

impl std::fmt::Display for ImporterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// A persisted checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMapping {
    pub id: String,
    pub importer_identity: String,
    pub importer_identity_hash: String,
    pub external_id: String,
    pub external_uri: Option<String>,
    pub node_id: String,
    pub node_path: String,
    pub node_path_hash: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Input of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecordMapping {
    pub identity: ImporterIdentity,
    pub external_id: String,
    pub external_uri: Option<String>,
    pub node_id: String,
    pub node_path: String,
}

impl NewRecordMapping {
    /// Builds the row inserted when no checkpoint exists yet.
    pub fn into_record(self) -> RecordMapping {
        let now = now_utc();
        RecordMapping {
            id: uuid::Uuid::new_v4().to_string(),
            importer_identity: self.identity.value().to_string(),
            importer_identity_hash: self.identity.hash().to_string(),
            external_id: self.external_id,
            external_uri: self.external_uri,
            node_path_hash: hash_value(&self.node_path),
            node_id: self.node_id,
            node_path: self.node_path,
            created_at: now,
            modified_at: now,
        }
    }
}

impl RecordMapping {
    /// True when applying `update` would change a mutable field.
    pub fn differs_from(&self, update: &NewRecordMapping) -> bool {
        self.external_uri != update.external_uri
            || self.node_id != update.node_id
            || self.node_path != update.node_path
    }

    /// Copies the mutable fields of `update` and bumps `modified_at` if anything changed.
    pub fn apply(&mut self, update: &NewRecordMapping) -> bool {
        if !self.differs_from(update) {
            return false;
        }
        self.external_uri = update.external_uri.clone();
        self.node_id = update.node_id.clone();
        self.node_path = update.node_path.clone();
        self.node_path_hash = hash_value(&update.node_path);
        self.modified_at = now_utc();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(node_id: &str) -> NewRecordMapping {
        NewRecordMapping {
            identity: ImporterIdentity::new("node", "people", "persons"),
            external_id: "42".to_string(),
            external_uri: None,
            node_id: node_id.to_string(),
            node_path: "/sites/demo/storage/p42".to_string(),
        }
    }

    #[test]
    fn test_identity_includes_preset_and_part() {
        let a = ImporterIdentity::new("node", "people", "persons");
        let b = ImporterIdentity::new("node", "people", "teams");
        assert_eq!(a.value(), "node@people/persons");
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash().len(), 64);
        assert_eq!(a.short_name(), "node");
    }

    #[test]
    fn test_apply_identical_values_is_noop() {
        let mut record = update("n-1").into_record();
        let before = record.modified_at;
        assert!(!record.apply(&update("n-1")));
        assert_eq!(record.modified_at, before);
    }

    #[test]
    fn test_apply_changed_node_updates_fields() {
        let mut record = update("n-1").into_record();
        assert!(record.apply(&update("n-2")));
        assert_eq!(record.node_id, "n-2");
        assert!(record.modified_at >= record.created_at);
    }
}
