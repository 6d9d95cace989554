use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::errors::{ConfigurationError, Result};
use crate::settings::Settings;
use crate::vault::Vault;

/// One raw record, keyed by field name.
pub type Record = Map<String, Value>;

/// A source of records for one batch window.
pub trait DataProvider: Send {
    /// Returns the records of the configured window, in source order.
    fn fetch(&mut self) -> Result<Vec<Record>>;
}

/// What a provider knows about the part it feeds.
#[derive(Clone)]
pub struct ProviderContext {
    pub preset: String,
    pub part: String,
    pub settings: Arc<Settings>,
    pub vault: Vault,
}

/// Arguments handed to a provider factory.
pub struct ProviderRequest<'a> {
    pub options: &'a Map<String, Value>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub context: ProviderContext,
}

impl ProviderRequest<'_> {
    /// Deserializes the provider options into a typed struct.
    pub fn parse_options<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.options.clone())).map_err(|e| {
            ConfigurationError::MissingOption {
                option: "data_provider_options".to_string(),
                context: format!(
                    "preset part \"{}/{}\" settings ({})",
                    self.context.preset, self.context.part, e
                ),
            }
            .into()
        })
    }

    /// Window as (offset, limit); a missing or zero limit means "everything".
    pub fn window(&self) -> (usize, Option<usize>) {
        (
            self.offset.unwrap_or(0),
            self.limit.filter(|limit| *limit > 0),
        )
    }
}
