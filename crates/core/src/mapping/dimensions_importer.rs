use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{NodePropertyMapper, ProviderPropertyValidity};
use crate::constants::DIMENSIONS_KEY;
use crate::content::{ContentRepositoryTrait, Dimensions, Node, NodeTypeRegistry};
use crate::errors::{ConfigurationError, Result};
use crate::events::AuditEvent;

/// Applies the `@dimensions` section of a record to the node variants.
///
/// ```text
/// { "title": "Team", "@dimensions": { "@de": { "title": "Mannschaft" } } }
/// ```
pub struct DimensionsImporter {
    content: Arc<dyn ContentRepositoryTrait>,
    mapper: Arc<NodePropertyMapper>,
    node_types: Arc<NodeTypeRegistry>,
    presets: BTreeMap<String, Dimensions>,
}

impl DimensionsImporter {
    pub fn new(
        content: Arc<dyn ContentRepositoryTrait>,
        mapper: Arc<NodePropertyMapper>,
        node_types: Arc<NodeTypeRegistry>,
        presets: BTreeMap<String, Dimensions>,
    ) -> Self {
        Self {
            content,
            mapper,
            node_types,
            presets,
        }
    }

    pub async fn process(
        &self,
        node: &Node,
        data: &Map<String, Value>,
        event: Option<&AuditEvent>,
    ) -> Result<()> {
        let Some(Value::Object(dimensions_data)) = data.get(DIMENSIONS_KEY) else {
            return Ok(());
        };

        let node_type = self.node_types.get(&node.node_type)?;
        let validity = ProviderPropertyValidity::new(node_type);
        let base = validity.filter(data);

        for (preset, overrides) in dimensions_data {
            let key = preset.trim_start_matches('@');
            let dimensions = self
                .presets
                .get(key)
                .ok_or_else(|| ConfigurationError::UnknownDimensionPreset(key.to_string()))?;

            let mut properties = base.clone();
            if let Value::Object(overrides) = overrides {
                merge_overrule(&mut properties, &validity.filter(overrides));
            }

            let mut variant = self.content.variant(node, dimensions).await?;
            if self.mapper.map(&properties, &mut variant, event).await? {
                self.content.save_properties(&variant).await?;
            }
        }
        Ok(())
    }
}

/// Recursive merge where `overrides` wins, nested objects are merged key by key.
fn merge_overrule(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        if let (Some(Value::Object(existing)), Value::Object(nested)) = (base.get_mut(key), value)
        {
            merge_overrule(existing, nested);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}
