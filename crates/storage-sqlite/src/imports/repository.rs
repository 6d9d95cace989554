use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use contentimport_core::imports::{ImportRun, ImportRunRepositoryTrait};
use contentimport_core::Result;

use super::model::ImportRunDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::import_runs;
use crate::schema::import_runs::dsl::*;

pub struct ImportRunRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ImportRunRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ImportRunRepository { pool, writer }
    }
}

#[async_trait]
impl ImportRunRepositoryTrait for ImportRunRepository {
    async fn create(&self, run: ImportRun) -> Result<ImportRun> {
        let run_db = ImportRunDB::from(&run);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ImportRun> {
                let result_db = diesel::insert_into(import_runs::table)
                    .values(&run_db)
                    .returning(ImportRunDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(ImportRun::from(result_db))
            })
            .await
    }

    async fn update(&self, run: ImportRun) -> Result<ImportRun> {
        let run_db = ImportRunDB::from(&run);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ImportRun> {
                let result_db = diesel::update(import_runs.find(run_db.id.clone()))
                    .set(&run_db)
                    .returning(ImportRunDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(ImportRun::from(result_db))
            })
            .await
    }

    fn get_by_id(&self, run_id: &str) -> Result<Option<ImportRun>> {
        let mut conn = get_connection(&self.pool)?;
        let run_db = import_runs
            .find(run_id)
            .first::<ImportRunDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(run_db.map(ImportRun::from))
    }

    fn find_by_external_run_id(&self, external: &str) -> Result<Option<ImportRun>> {
        let mut conn = get_connection(&self.pool)?;
        let run_db = import_runs
            .filter(external_run_id.eq(external))
            .order(started_at.desc())
            .first::<ImportRunDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(run_db.map(ImportRun::from))
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<ImportRun>> {
        let mut conn = get_connection(&self.pool)?;
        let runs_db = import_runs
            .order(started_at.desc())
            .limit(limit)
            .load::<ImportRunDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(runs_db.into_iter().map(ImportRun::from).collect())
    }
}
