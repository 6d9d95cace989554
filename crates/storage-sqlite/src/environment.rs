//! Wiring of the SQLite repositories into a step environment.

use log::debug;
use std::sync::Arc;

use contentimport_core::batch::{StepEnvironment, StepEnvironmentFactory};
use contentimport_core::Result;

use crate::content::ContentRepository;
use crate::db::{create_pool, init, run_migrations, spawn_writer};
use crate::events::EventRepository;
use crate::imports::ImportRunRepository;
use crate::record_mappings::RecordMappingRepository;
use crate::vault::VaultRepository;

/// Opens environments backed by one SQLite database file.
///
/// Every call to [`StepEnvironmentFactory::open`] creates its own pool and
/// writer, which are released when the environment is dropped.
#[derive(Debug, Clone)]
pub struct SqliteEnvironmentFactory {
    db_path: String,
}

impl SqliteEnvironmentFactory {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Prepares the database file and applies pending migrations.
    pub fn migrate(&self) -> Result<()> {
        init(&self.db_path)?;
        let pool = create_pool(&self.db_path)?;
        run_migrations(&pool)
    }
}

impl StepEnvironmentFactory for SqliteEnvironmentFactory {
    fn open(&self) -> Result<StepEnvironment> {
        debug!("Opening storage at {}", self.db_path);
        let pool = create_pool(&self.db_path)?;
        let writer = spawn_writer((*pool).clone());

        Ok(StepEnvironment {
            import_runs: Arc::new(ImportRunRepository::new(pool.clone(), writer.clone())),
            events: Arc::new(EventRepository::new(pool.clone(), writer.clone())),
            record_mappings: Arc::new(RecordMappingRepository::new(pool.clone(), writer.clone())),
            content: Arc::new(ContentRepository::new(pool.clone(), writer.clone())),
            vault: Arc::new(VaultRepository::new(pool, writer)),
        })
    }
}
