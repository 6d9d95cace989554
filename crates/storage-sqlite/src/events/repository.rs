use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use contentimport_core::events::{AuditEvent, EventRepositoryTrait};
use contentimport_core::Result;

use super::model::AuditEventDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::audit_events;
use crate::schema::audit_events::dsl::*;

pub struct EventRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl EventRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        EventRepository { pool, writer }
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent> {
        let event_db = AuditEventDB::try_from(&event)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AuditEvent> {
                diesel::insert_into(audit_events::table)
                    .values(&event_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(event)
            })
            .await
    }

    fn list_for_import(&self, run_id: &str) -> Result<Vec<AuditEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let events_db = audit_events
            .filter(import_id.eq(run_id))
            .order((created_at.asc(), id.asc()))
            .load::<AuditEventDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(events_db.into_iter().map(AuditEvent::from).collect())
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let total = audit_events
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total)
    }

    async fn remove_all(&self) -> Result<usize> {
        self.writer
            .exec(|conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::delete(audit_events::table)
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
    use contentimport_core::events::Severity;
    use serde_json::{json, Map};

    #[tokio::test]
    async fn test_events_are_listed_per_import_and_flushed() {
        let db = test_db::setup();
        let repository = EventRepository::new(db.pool.clone(), spawn_writer((*db.pool).clone()));

        let mut event_data = Map::new();
        event_data.insert("__message".to_string(), json!("Record 42 started"));
        let parent = repository
            .append(AuditEvent::new(
                "run-1",
                "node:Record:Started",
                Some("42"),
                event_data,
                Severity::Info,
                None,
            ))
            .await
            .unwrap();
        repository
            .append(AuditEvent::new(
                "run-1",
                "Node:Processed:Skipped",
                Some("42"),
                Map::new(),
                Severity::Notice,
                Some(&parent),
            ))
            .await
            .unwrap();
        repository
            .append(AuditEvent::new("run-2", "Import.Started", None, Map::new(), Severity::Info, None))
            .await
            .unwrap();

        let events = repository.list_for_import("run-1").unwrap();
        assert_eq!(events.len(), 2);
        let stored_parent = events.iter().find(|e| e.id == parent.id).unwrap();
        assert_eq!(stored_parent.message(), Some("Record 42 started"));
        let child = events.iter().find(|e| e.id != parent.id).unwrap();
        assert_eq!(child.severity, Severity::Notice);
        assert_eq!(child.parent_event_id.as_deref(), Some(parent.id.as_str()));

        assert_eq!(repository.count().unwrap(), 3);
        assert_eq!(repository.remove_all().await.unwrap(), 3);
        assert_eq!(repository.count().unwrap(), 0);
    }
}
