use serde_json::{Map, Value};
use std::sync::Arc;

use super::{values_equal, ProviderPropertyValidity};
use crate::constants::NODE_IDENTIFIER_KEY;
use crate::content::{NodeTypeRegistry, PropertyTarget};
use crate::errors::Result;
use crate::events::{AuditEvent, Severity};
use crate::imports::ImportService;
use crate::settings::PropertyComparison;

/// Writes record data onto a node or node template.
pub struct NodePropertyMapper {
    import_service: Arc<ImportService>,
    node_types: Arc<NodeTypeRegistry>,
    comparison: PropertyComparison,
    record_log_enabled: bool,
}

impl NodePropertyMapper {
    pub fn new(
        import_service: Arc<ImportService>,
        node_types: Arc<NodeTypeRegistry>,
        comparison: PropertyComparison,
        record_log_enabled: bool,
    ) -> Self {
        Self {
            import_service,
            node_types,
            comparison,
            record_log_enabled,
        }
    }

    /// Applies the valid properties of `data` to `target`.
    ///
    /// Returns true when at least one property changed. For persisted nodes
    /// an `Updated` or `Skipped` event is recorded below `event`; saving the
    /// node is left to the caller.
    pub async fn map<T: PropertyTarget>(
        &self,
        data: &Map<String, Value>,
        target: &mut T,
        event: Option<&AuditEvent>,
    ) -> Result<bool> {
        let node_type = self.node_types.get(target.node_type())?;
        let validity = ProviderPropertyValidity::new(node_type);

        let mut changed = false;
        for (name, value) in data {
            if !validity.is_valid(name) {
                continue;
            }
            if !values_equal(target.property(name), value, self.comparison) {
                target.set_property(name, value.clone());
                changed = true;
            }
        }

        if let Some(identifier) = data.get(NODE_IDENTIFIER_KEY).and_then(Value::as_str) {
            target.set_identifier(identifier.trim());
        }

        if self.record_log_enabled {
            if let Some(node) = target.as_node() {
                let (event_type, message, severity) = if changed {
                    (
                        "Node:Processed:Updated",
                        format!(
                            "Updating existing node \"{}\" {} ({})",
                            node.label(),
                            node.context_path(),
                            node.identifier
                        ),
                        Severity::Info,
                    )
                } else {
                    (
                        "Node:Processed:Skipped",
                        format!(
                            "Skipping unchanged node \"{}\" {} ({})",
                            node.label(),
                            node.context_path(),
                            node.identifier
                        ),
                        Severity::Notice,
                    )
                };
                self.import_service
                    .add_event_message(event_type, &message, severity, event)
                    .await?;
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Node, NodeTemplate};
    use crate::settings::NodeTypeSettings;
    use crate::test_support::{
        InMemoryEventRepository, InMemoryImportRunRepository, InMemoryRecordMappingRepository,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    async fn setup(comparison: PropertyComparison) -> (NodePropertyMapper, InMemoryEventRepository) {
        let events = InMemoryEventRepository::default();
        let import_service = Arc::new(ImportService::new(
            Arc::new(InMemoryImportRunRepository::default()),
            Arc::new(events.clone()),
            Arc::new(InMemoryRecordMappingRepository::default()),
        ));
        import_service.start(None, false).await.unwrap();

        let mut types = BTreeMap::new();
        types.insert(
            "Person".to_string(),
            NodeTypeSettings {
                properties: vec!["email".to_string(), "age".to_string()],
                super_types: vec!["Page".to_string()],
            },
        );
        let mapper = NodePropertyMapper::new(
            import_service,
            Arc::new(NodeTypeRegistry::from_settings(&types)),
            comparison,
            true,
        );
        (mapper, events)
    }

    fn person_node() -> Node {
        let mut node = Node::root();
        node.identifier = "n-1".to_string();
        node.path = "/sites/demo/storage/p1".to_string();
        node.name = "p1".to_string();
        node.node_type = "Person".to_string();
        node
    }

    #[tokio::test]
    async fn test_identical_properties_twice_report_unchanged() {
        let (mapper, events) = setup(PropertyComparison::Loose).await;
        let data = json!({"title": "Jane", "email": "jane@example.com", "phone": "123"});
        let data = data.as_object().unwrap();
        let mut node = person_node();

        assert!(mapper.map(data, &mut node, None).await.unwrap());
        assert!(!mapper.map(data, &mut node, None).await.unwrap());
        assert!(node.properties.get("phone").is_none());

        let types = events.event_types();
        assert_eq!(
            &types[types.len() - 2..],
            &["Node:Processed:Updated", "Node:Processed:Skipped"]
        );
    }

    #[tokio::test]
    async fn test_loose_comparison_ignores_type_changes() {
        let (loose, _) = setup(PropertyComparison::Loose).await;
        let (strict, _) = setup(PropertyComparison::Strict).await;
        let mut node = person_node();
        node.properties.insert("age".to_string(), json!(42));
        let data = json!({"age": "42"});

        assert!(!loose.map(data.as_object().unwrap(), &mut node.clone(), None).await.unwrap());
        assert!(strict.map(data.as_object().unwrap(), &mut node, None).await.unwrap());
        assert_eq!(node.properties["age"], json!("42"));
    }

    #[tokio::test]
    async fn test_template_receives_identifier_without_events() {
        let (mapper, events) = setup(PropertyComparison::Loose).await;
        let before = events.event_types().len();
        let mut template = NodeTemplate::new("Person", "p1");
        let data = json!({"title": "Jane", "__identifier": " fixed-id "});

        assert!(mapper.map(data.as_object().unwrap(), &mut template, None).await.unwrap());
        assert_eq!(template.identifier.as_deref(), Some("fixed-id"));
        assert_eq!(events.event_types().len(), before);
    }
}
