use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use contentimport_core::record_mappings::{
    ImporterIdentity, NewRecordMapping, RecordMapping, RecordMappingRepositoryTrait,
};
use contentimport_core::Result;

use super::model::RecordMappingDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::record_mappings;
use crate::schema::record_mappings::dsl::*;

pub struct RecordMappingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RecordMappingRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        RecordMappingRepository { pool, writer }
    }
}

#[async_trait]
impl RecordMappingRepositoryTrait for RecordMappingRepository {
    fn find(&self, identity: &ImporterIdentity, external: &str) -> Result<Option<RecordMapping>> {
        let mut conn = get_connection(&self.pool)?;
        let mapping_db = record_mappings
            .filter(importer_identity_hash.eq(identity.hash()))
            .filter(external_id.eq(external))
            .first::<RecordMappingDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(mapping_db.map(RecordMapping::from))
    }

    fn count_for_importer(&self, identity: &ImporterIdentity) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let total = record_mappings
            .filter(importer_identity_hash.eq(identity.hash()))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total)
    }

    async fn upsert(&self, mapping: NewRecordMapping) -> Result<RecordMapping> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<RecordMapping> {
                let existing = record_mappings
                    .filter(importer_identity_hash.eq(mapping.identity.hash()))
                    .filter(external_id.eq(&mapping.external_id))
                    .first::<RecordMappingDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                match existing {
                    Some(row) => {
                        let mut current = RecordMapping::from(row);
                        if current.apply(&mapping) {
                            let changes = RecordMappingDB::from(&current);
                            diesel::update(record_mappings.find(&changes.id))
                                .set(&changes)
                                .execute(conn)
                                .map_err(StorageError::from)?;
                            debug!(
                                "Checkpoint {} of {} now points to {}",
                                current.external_id, current.importer_identity, current.node_path
                            );
                        }
                        Ok(current)
                    }
                    None => {
                        let created = mapping.into_record();
                        diesel::insert_into(record_mappings::table)
                            .values(RecordMappingDB::from(&created))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        Ok(created)
                    }
                }
            })
            .await
    }

    async fn remove_all_for_importer(&self, identity: &ImporterIdentity) -> Result<usize> {
        let hash = identity.hash().to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::delete(
                    record_mappings.filter(importer_identity_hash.eq(hash)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(removed)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::spawn_writer;
    use crate::utils::test_db;

    fn mapping(identity: &ImporterIdentity, external: &str, node: &str) -> NewRecordMapping {
        NewRecordMapping {
            identity: identity.clone(),
            external_id: external.to_string(),
            external_uri: None,
            node_id: node.to_string(),
            node_path: format!("/sites/demo/storage/{}", node),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() {
        let db = test_db::setup();
        let repository =
            RecordMappingRepository::new(db.pool.clone(), spawn_writer((*db.pool).clone()));
        let identity = ImporterIdentity::new("node", "people", "persons");

        let created = repository.upsert(mapping(&identity, "42", "n-1")).await.unwrap();
        assert_eq!(repository.find(&identity, "42").unwrap(), Some(created.clone()));
        let unchanged = repository.upsert(mapping(&identity, "42", "n-1")).await.unwrap();
        assert_eq!(unchanged.id, created.id);
        assert_eq!(unchanged.modified_at, created.modified_at);

        let moved = repository.upsert(mapping(&identity, "42", "n-2")).await.unwrap();
        assert_eq!(moved.id, created.id);
        assert_eq!(moved.node_id, "n-2");

        let stored = repository.find(&identity, "42").unwrap().unwrap();
        assert_eq!(stored, moved);
        assert_eq!(stored.node_path, "/sites/demo/storage/n-2");
        assert_eq!(repository.count_for_importer(&identity).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_identities_are_isolated() {
        let db = test_db::setup();
        let repository =
            RecordMappingRepository::new(db.pool.clone(), spawn_writer((*db.pool).clone()));
        let persons = ImporterIdentity::new("node", "people", "persons");
        let teams = ImporterIdentity::new("node", "people", "teams");

        repository.upsert(mapping(&persons, "1", "p-1")).await.unwrap();
        repository.upsert(mapping(&persons, "2", "p-2")).await.unwrap();
        repository.upsert(mapping(&teams, "1", "t-1")).await.unwrap();

        assert_eq!(repository.find(&teams, "1").unwrap().unwrap().node_id, "t-1");
        assert!(repository.find(&teams, "2").unwrap().is_none());

        assert_eq!(repository.remove_all_for_importer(&persons).await.unwrap(), 2);
        assert_eq!(repository.count_for_importer(&persons).unwrap(), 0);
        assert_eq!(repository.count_for_importer(&teams).unwrap(), 1);
    }
}
