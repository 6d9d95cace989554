//! Audit event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::EVENT_MESSAGE_KEY;
use crate::utils::time_utils::now_utc;

/// Syslog style severities, lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    #[default]
    Info,
    Debug,
}

impl Severity {
    pub fn as_i32(self) -> i32 {
        match self {
            Severity::Emergency => 0,
            Severity::Alert => 1,
            Severity::Critical => 2,
            Severity::Error => 3,
            Severity::Warning => 4,
            Severity::Notice => 5,
            Severity::Info => 6,
            Severity::Debug => 7,
        }
    }

    /// Unknown values map to `Info`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            7 => Severity::Debug,
            _ => Severity::Info,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Emergency => "Emergency",
            Severity::Alert => "Alert",
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Notice => "Notice",
            Severity::Info => "Info",
            Severity::Debug => "Debug",
        }
    }

    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                log::Level::Error
            }
            Severity::Warning => log::Level::Warn,
            Severity::Notice | Severity::Info => log::Level::Info,
            Severity::Debug => log::Level::Debug,
        }
    }
}

/// A single audit event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub import_id: String,
    pub event_type: String,
    pub external_id: Option<String>,
    pub data: Map<String, Value>,
    pub severity: Severity,
    pub parent_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        import_id: &str,
        event_type: &str,
        external_id: Option<&str>,
        data: Map<String, Value>,
        severity: Severity,
        parent: Option<&AuditEvent>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            import_id: import_id.to_string(),
            event_type: event_type.to_string(),
            external_id: external_id.map(str::to_string),
            data,
            severity,
            parent_event_id: parent.map(|p| p.id.clone()),
            created_at: now_utc(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.data.get(EVENT_MESSAGE_KEY).and_then(Value::as_str)
    }
}
