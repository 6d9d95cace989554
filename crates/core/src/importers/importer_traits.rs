use async_trait::async_trait;
use serde_json::Value;

use crate::constants::{DEFAULT_EXTERNAL_IDENTIFIER_KEY, DEFAULT_LABEL_KEY};
use crate::content::Node;
use crate::data_providers::Record;
use crate::errors::Result;
use crate::events::AuditEvent;

/// Imports the records of one batch step.
#[async_trait]
pub trait Importer: Send + Sync {
    /// Type name the importer is registered under, used in event types.
    fn name(&self) -> &str;

    /// Resolves everything the importer writes into. Called once per step.
    async fn initialize(&mut self) -> Result<()>;

    /// Creates or updates the node of one record.
    ///
    /// `event` is the `Record:Started` event, child events hang below it.
    async fn process_record(&mut self, record: &Record, event: Option<&AuditEvent>) -> Result<Node>;

    /// Number of records processed so far.
    fn processed_records(&self) -> usize;

    fn external_identifier(&self, record: &Record) -> Option<String> {
        value_by_path(record, DEFAULT_EXTERNAL_IDENTIFIER_KEY).and_then(value_as_string)
    }

    fn label(&self, record: &Record) -> Option<String> {
        value_by_path(record, DEFAULT_LABEL_KEY).and_then(value_as_string)
    }
}

/// Looks up a dotted path (`person.id`) in a record.
pub fn value_by_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// String form of a scalar value, `None` for null.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_by_path() {
        let record = json!({"__externalIdentifier": 42, "person": {"names": ["Ada", "Grace"]}});
        let record = record.as_object().unwrap();
        assert_eq!(
            value_by_path(record, "__externalIdentifier").and_then(value_as_string),
            Some("42".to_string())
        );
        assert_eq!(value_by_path(record, "person.names.1"), Some(&json!("Grace")));
        assert_eq!(value_by_path(record, "person.age"), None);
        assert_eq!(value_as_string(&Value::Null), None);
    }
}
