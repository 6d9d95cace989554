use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::{value_as_string, value_by_path, Importer, ImporterContext};
use crate::constants::{
    DEFAULT_EXTERNAL_IDENTIFIER_KEY, DEFAULT_LABEL_KEY, DEFAULT_STORAGE_NODE_PATH,
    DEFAULT_STORAGE_NODE_TITLE, DEFAULT_STORAGE_NODE_TYPE, URI_PATH_SEGMENT_PROPERTY,
};
use crate::content::{Dimensions, Node, NodeTemplate};
use crate::data_providers::Record;
use crate::data_types::{slugify, DataTypeKind};
use crate::errors::{DataProviderError, Error, Result};
use crate::events::{AuditEvent, Severity};
use crate::record_mappings::ImporterIdentity;

#[derive(Debug, Clone, Deserialize)]
pub struct NodeImporterOptions {
    pub node_type: Option<String>,
    #[serde(default)]
    pub site_node_path: Option<String>,
    #[serde(default)]
    pub site_node_identifier: Option<String>,
    /// Path below the site node, or `#<identifier>`
    #[serde(default = "default_storage_node_path")]
    pub storage_node_path: String,
    #[serde(default)]
    pub storage_node_identifier: Option<String>,
    #[serde(default = "default_storage_node_title")]
    pub storage_node_title: String,
    #[serde(default = "default_storage_node_type")]
    pub storage_node_type: String,
    #[serde(default = "default_external_identifier_key")]
    pub external_identifier_key: String,
    #[serde(default = "default_label_key")]
    pub label_key: String,
    #[serde(default)]
    pub node_name_prefix: Option<String>,
    /// Data type applied to a record field before mapping
    #[serde(default)]
    pub property_types: BTreeMap<String, DataTypeKind>,
    /// Adopt a node that already exists under the generated name instead of failing
    #[serde(default)]
    pub skip_existing_nodes: bool,
}

fn default_storage_node_path() -> String {
    DEFAULT_STORAGE_NODE_PATH.to_string()
}

fn default_storage_node_title() -> String {
    DEFAULT_STORAGE_NODE_TITLE.to_string()
}

fn default_storage_node_type() -> String {
    DEFAULT_STORAGE_NODE_TYPE.to_string()
}

fn default_external_identifier_key() -> String {
    DEFAULT_EXTERNAL_IDENTIFIER_KEY.to_string()
}

fn default_label_key() -> String {
    DEFAULT_LABEL_KEY.to_string()
}

/// Generic importer: one node of `node_type` per record, below a storage node.
pub struct NodeImporter {
    name: String,
    node_type: String,
    options: NodeImporterOptions,
    context: ImporterContext,
    identity: ImporterIdentity,
    storage_node: Option<Node>,
    processed: usize,
}

impl NodeImporter {
    pub fn new(name: &str, options: &Map<String, Value>, context: ImporterContext) -> Result<Self> {
        let settings_context = format!(
            "importer options of preset part \"{}/{}\"",
            context.preset, context.part
        );
        let options: NodeImporterOptions = serde_json::from_value(Value::Object(options.clone()))
            .map_err(|e| {
                Error::missing_option("importer_options", format!("{} ({})", settings_context, e))
            })?;
        let node_type = options
            .node_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::missing_option("node_type", &settings_context))?;

        Ok(Self {
            name: name.to_string(),
            node_type,
            identity: context.identity(name),
            options,
            context,
            storage_node: None,
            processed: 0,
        })
    }

    pub fn storage_node(&self) -> Result<&Node> {
        self.storage_node
            .as_ref()
            .ok_or_else(|| Error::NodeNotFound("storage node is not initialized".to_string()))
    }

    fn default_dimensions() -> Dimensions {
        Dimensions::new()
    }

    fn site_node(&self) -> Result<Node> {
        let content = &self.context.content;
        if let Some(path) = self.options.site_node_path.as_deref().map(str::trim) {
            return content
                .get_by_path(path, &Self::default_dimensions())?
                .ok_or_else(|| Error::NodeNotFound(format!("Site node not found ({})", path)));
        }
        if let Some(identifier) = self.options.site_node_identifier.as_deref().map(str::trim) {
            return content
                .get_by_identifier(identifier, &Self::default_dimensions())?
                .ok_or_else(|| Error::NodeNotFound(format!("Site node not found ({})", identifier)));
        }
        Err(Error::missing_option(
            "site_node_path",
            format!(
                "importer options of preset part \"{}/{}\"",
                self.context.preset, self.context.part
            ),
        ))
    }

    fn node_by_identifier(&self, identifier: &str) -> Result<Node> {
        self.context
            .content
            .get_by_identifier(identifier, &Self::default_dimensions())?
            .ok_or_else(|| {
                Error::NodeNotFound(format!(
                    "The storage node with identifier \"{}\" was not found",
                    identifier
                ))
            })
    }

    async fn resolve_storage_node(&self) -> Result<Node> {
        if let Some(identifier) = self.options.storage_node_identifier.as_deref() {
            return self.node_by_identifier(identifier.trim());
        }
        let storage_path = self.options.storage_node_path.trim();
        if let Some(identifier) = storage_path.strip_prefix('#') {
            return self.node_by_identifier(identifier);
        }

        let site = self.site_node()?;
        let relative = storage_path.trim_matches('/');
        let path = site.child_path(relative);
        if let Some(existing) = self
            .context
            .content
            .get_by_path(&path, &Self::default_dimensions())?
        {
            return Ok(existing);
        }

        let (parent, name) = match relative.rsplit_once('/') {
            Some((parent_path, name)) => {
                let parent_path = site.child_path(parent_path);
                let parent = self
                    .context
                    .content
                    .get_by_path(&parent_path, &Self::default_dimensions())?
                    .ok_or_else(|| Error::NodeNotFound(parent_path.clone()))?;
                (parent, name)
            }
            None => (site, relative),
        };

        self.context.node_types.get(&self.options.storage_node_type)?;
        let title = &self.options.storage_node_title;
        let mut template = NodeTemplate::new(self.options.storage_node_type.clone(), name);
        template.properties.insert("title".to_string(), json!(title));
        template
            .properties
            .insert(URI_PATH_SEGMENT_PROPERTY.to_string(), json!(slugify(title)));
        let storage = self.context.content.create_child(&parent, template).await?;
        self.context
            .log(
                &format!("Storage node created at {}", storage.path),
                Severity::Info,
                None,
            )
            .await?;
        Ok(storage)
    }

    fn node_name(&self, external_id: &str) -> String {
        let prefix = self
            .options
            .node_name_prefix
            .clone()
            .unwrap_or_else(|| format!("{:08x}", rand::random::<u32>()));
        slugify(&format!("{}{}", prefix, external_id))
    }

    async fn convert_properties(&self, data: &mut Record) -> Result<()> {
        for (property, kind) in &self.options.property_types {
            if let Some(value) = data.get(property) {
                let converted = self.context.data_types.convert(*kind, value).await?;
                data.insert(property.clone(), converted);
            }
        }
        Ok(())
    }

    /// Decides whether a record can be skipped before creating its node.
    ///
    /// An existing node under `node_name` is adopted by writing its checkpoint.
    pub async fn skip_node_processing(
        &self,
        external_id: &str,
        node_name: &str,
        skip_existing_node: bool,
        skip_already_processed: bool,
        event: Option<&AuditEvent>,
    ) -> Result<bool> {
        let import_service = &self.context.import_service;
        if skip_already_processed
            && self
                .context
                .processed_nodes
                .get(&self.identity, external_id)?
                .is_some()
        {
            import_service
                .add_event_message(
                    "Node:Processed:Skipped",
                    "Skip already processed",
                    Severity::Notice,
                    event,
                )
                .await?;
            return Ok(true);
        }

        let storage = self.storage_node()?;
        let existing = self
            .context
            .content
            .get_by_path(&storage.child_path(node_name), &storage.dimensions)?;
        if let (true, Some(node)) = (skip_existing_node, existing) {
            import_service
                .add_event_message(
                    "Node:Existing:Skipped",
                    "Skip existing node",
                    Severity::Warning,
                    event,
                )
                .await?;
            self.context
                .processed_nodes
                .set(&self.identity, external_id, None, &node.identifier, &node.path)
                .await?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl Importer for NodeImporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&mut self) -> Result<()> {
        self.context.node_types.get(&self.node_type)?;
        let storage = self.resolve_storage_node().await?;
        log::debug!(
            "{} imports into {} ({})",
            self.name,
            storage.path,
            storage.identifier
        );
        self.storage_node = Some(storage);
        Ok(())
    }

    async fn process_record(&mut self, record: &Record, event: Option<&AuditEvent>) -> Result<Node> {
        let external_id = self.external_identifier(record).ok_or_else(|| {
            DataProviderError::MissingRecordField {
                what: "external identifier".to_string(),
                key: self.options.external_identifier_key.clone(),
            }
        })?;

        let mut data = record.clone();
        self.convert_properties(&mut data).await?;
        if !data.contains_key(URI_PATH_SEGMENT_PROPERTY) {
            let label = self
                .label(record)
                .ok_or_else(|| DataProviderError::MissingRecordField {
                    what: "label".to_string(),
                    key: self.options.label_key.clone(),
                })?;
            data.insert(URI_PATH_SEGMENT_PROPERTY.to_string(), json!(slugify(&label)));
        }

        let content = self.context.content.clone();
        let mapper = self.context.mapper.clone();

        let node = match self.context.processed_nodes.get(&self.identity, &external_id)? {
            Some(mapping) => {
                let mut node = content
                    .get_by_identifier(&mapping.node_id, &Self::default_dimensions())?
                    .ok_or_else(|| Error::RecordMappingNotFound {
                        external_id: external_id.clone(),
                        node_id: mapping.node_id.clone(),
                    })?;
                if mapper.map(&data, &mut node, event).await? {
                    node = content.save_properties(&node).await?;
                }
                node
            }
            None => {
                let node_name = self.node_name(&external_id);
                if self.options.skip_existing_nodes
                    && self
                        .skip_node_processing(&external_id, &node_name, true, false, event)
                        .await?
                {
                    self.processed += 1;
                    let storage = self.storage_node()?;
                    return content
                        .get_by_path(&storage.child_path(&node_name), &storage.dimensions)?
                        .ok_or_else(|| Error::NodeNotFound(node_name.clone()));
                }

                let mut template = NodeTemplate::new(self.node_type.clone(), node_name);
                mapper.map(&data, &mut template, event).await?;
                content.create_child(self.storage_node()?, template).await?
            }
        };

        self.context
            .processed_nodes
            .set(&self.identity, &external_id, None, &node.identifier, &node.path)
            .await?;
        self.context.dimensions.process(&node, &data, event).await?;

        self.processed += 1;
        Ok(node)
    }

    fn processed_records(&self) -> usize {
        self.processed
    }

    fn external_identifier(&self, record: &Record) -> Option<String> {
        value_by_path(record, &self.options.external_identifier_key).and_then(value_as_string)
    }

    fn label(&self, record: &Record) -> Option<String> {
        value_by_path(record, &self.options.label_key).and_then(value_as_string)
    }
}

impl std::fmt::Debug for NodeImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeImporter")
            .field("name", &self.name)
            .field("node_type", &self.node_type)
            .field("identity", &self.identity.value())
            .field("processed", &self.processed)
            .finish()
    }
}
