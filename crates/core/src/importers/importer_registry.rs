use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{Importer, ImporterContext, NodeImporter};
use crate::errors::{ConfigurationError, Result};

pub type ImporterFactory =
    Box<dyn Fn(&str, &Map<String, Value>, ImporterContext) -> Result<Box<dyn Importer>> + Send + Sync>;

/// Maps an importer type name from the settings to its factory.
pub struct ImporterRegistry {
    factories: HashMap<String, ImporterFactory>,
}

impl ImporterRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: ImporterFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(
        &self,
        name: &str,
        options: &Map<String, Value>,
        context: ImporterContext,
    ) -> Result<Box<dyn Importer>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownImporter(name.to_string()))?;
        factory(name, options, context)
    }
}

impl Default for ImporterRegistry {
    /// Registry with the generic `node` importer.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("node", Box::new(node_factory));
        registry
    }
}

fn node_factory(
    name: &str,
    options: &Map<String, Value>,
    context: ImporterContext,
) -> Result<Box<dyn Importer>> {
    Ok(Box::new(NodeImporter::new(name, options, context)?))
}
