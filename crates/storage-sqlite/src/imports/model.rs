//! Database models for import runs.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{timestamp_from_text, timestamp_to_text};
use contentimport_core::imports::ImportRun;

/// Database model for import runs
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
#[diesel(table_name = crate::schema::import_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ImportRunDB {
    pub id: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub external_run_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ImportRunDB> for ImportRun {
    fn from(db: ImportRunDB) -> Self {
        Self {
            id: db.id,
            started_at: timestamp_from_text(&db.started_at),
            ended_at: db.ended_at.as_deref().map(timestamp_from_text),
            external_run_id: db.external_run_id,
            created_at: timestamp_from_text(&db.created_at),
            updated_at: timestamp_from_text(&db.updated_at),
        }
    }
}

impl From<&ImportRun> for ImportRunDB {
    fn from(run: &ImportRun) -> Self {
        Self {
            id: run.id.clone(),
            started_at: timestamp_to_text(&run.started_at),
            ended_at: run.ended_at.as_ref().map(timestamp_to_text),
            external_run_id: run.external_run_id.clone(),
            created_at: timestamp_to_text(&run.created_at),
            updated_at: timestamp_to_text(&run.updated_at),
        }
    }
}
