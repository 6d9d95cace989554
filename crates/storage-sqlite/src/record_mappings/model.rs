//! Database models for record mappings.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{timestamp_from_text, timestamp_to_text};
use contentimport_core::record_mappings::RecordMapping;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::record_mappings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct RecordMappingDB {
    pub id: String,
    pub importer_identity: String,
    pub importer_identity_hash: String,
    pub external_id: String,
    pub external_uri: Option<String>,
    pub node_id: String,
    pub node_path: String,
    pub node_path_hash: String,
    pub created_at: String,
    pub modified_at: String,
}

impl From<RecordMappingDB> for RecordMapping {
    fn from(db: RecordMappingDB) -> Self {
        Self {
            id: db.id,
            importer_identity: db.importer_identity,
            importer_identity_hash: db.importer_identity_hash,
            external_id: db.external_id,
            external_uri: db.external_uri,
            node_id: db.node_id,
            node_path: db.node_path,
            node_path_hash: db.node_path_hash,
            created_at: timestamp_from_text(&db.created_at),
            modified_at: timestamp_from_text(&db.modified_at),
        }
    }
}

impl From<&RecordMapping> for RecordMappingDB {
    fn from(mapping: &RecordMapping) -> Self {
        Self {
            id: mapping.id.clone(),
            importer_identity: mapping.importer_identity.clone(),
            importer_identity_hash: mapping.importer_identity_hash.clone(),
            external_id: mapping.external_id.clone(),
            external_uri: mapping.external_uri.clone(),
            node_id: mapping.node_id.clone(),
            node_path: mapping.node_path.clone(),
            node_path_hash: mapping.node_path_hash.clone(),
            created_at: timestamp_to_text(&mapping.created_at),
            modified_at: timestamp_to_text(&mapping.modified_at),
        }
    }
}
