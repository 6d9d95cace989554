use serde_json::Value;
use std::sync::Arc;

use super::VaultRepositoryTrait;
use crate::errors::Result;
use crate::record_mappings::hash_value;

/// Vault bound to one preset. Keys of different presets never collide.
#[derive(Clone)]
pub struct Vault {
    preset: String,
    repository: Arc<dyn VaultRepositoryTrait>,
}

impl Vault {
    pub fn new(preset: &str, repository: Arc<dyn VaultRepositoryTrait>) -> Self {
        Self {
            preset: preset.to_string(),
            repository,
        }
    }

    fn key_hash(&self, key: &str) -> String {
        hash_value(&format!("{}{}", self.preset, key))
    }

    pub fn preset(&self) -> &str {
        &self.preset
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.repository
            .set(&self.preset, &self.key_hash(key), value)
            .await
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.repository.get(&self.preset, &self.key_hash(key))
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    pub async fn flush(&self) -> Result<usize> {
        let removed = self.repository.flush(&self.preset).await?;
        log::debug!("Flushed {} vault entries of preset {}", removed, self.preset);
        Ok(removed)
    }
}
