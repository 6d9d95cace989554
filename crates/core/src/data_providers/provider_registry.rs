use std::collections::HashMap;

use super::{CsvDataProvider, DataProvider, ProviderRequest, SqliteQueryDataProvider};
use crate::errors::{ConfigurationError, Result};

pub type DataProviderFactory =
    Box<dyn Fn(ProviderRequest<'_>) -> Result<Box<dyn DataProvider>> + Send + Sync>;

/// Maps a provider type name from the settings to its factory.
pub struct DataProviderRegistry {
    factories: HashMap<String, DataProviderFactory>,
}

impl DataProviderRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: DataProviderFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str, request: ProviderRequest<'_>) -> Result<Box<dyn DataProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownDataProvider(name.to_string()))?;
        factory(request)
    }
}

impl Default for DataProviderRegistry {
    /// Registry with the `csv` and `sqlite_query` providers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("csv", Box::new(csv_factory));
        registry.register("sqlite_query", Box::new(sqlite_query_factory));
        registry
    }
}

fn csv_factory(request: ProviderRequest<'_>) -> Result<Box<dyn DataProvider>> {
    Ok(Box::new(CsvDataProvider::from_request(&request)?))
}

fn sqlite_query_factory(request: ProviderRequest<'_>) -> Result<Box<dyn DataProvider>> {
    Ok(Box::new(SqliteQueryDataProvider::from_request(&request)?))
}
