//! Database models for audit events.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::StorageError;
use crate::utils::{timestamp_from_text, timestamp_to_text};
use contentimport_core::events::{AuditEvent, Severity};

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEventDB {
    pub id: String,
    pub import_id: String,
    pub event_type: String,
    pub external_id: Option<String>,
    pub data: String,
    pub severity: i32,
    pub parent_event_id: Option<String>,
    pub created_at: String,
}

impl TryFrom<&AuditEvent> for AuditEventDB {
    type Error = StorageError;

    fn try_from(event: &AuditEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id.clone(),
            import_id: event.import_id.clone(),
            event_type: event.event_type.clone(),
            external_id: event.external_id.clone(),
            data: serde_json::to_string(&event.data)?,
            severity: event.severity.as_i32(),
            parent_event_id: event.parent_event_id.clone(),
            created_at: timestamp_to_text(&event.created_at),
        })
    }
}

impl From<AuditEventDB> for AuditEvent {
    fn from(db: AuditEventDB) -> Self {
        // rows written by older versions may hold non-object data
        let data = match serde_json::from_str::<Value>(&db.data) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
            Err(_) => Map::new(),
        };
        Self {
            id: db.id,
            import_id: db.import_id,
            event_type: db.event_type,
            external_id: db.external_id,
            data,
            severity: Severity::from_i32(db.severity),
            parent_event_id: db.parent_event_id,
            created_at: timestamp_from_text(&db.created_at),
        }
    }
}
