use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Storage of vault entries, keyed by (preset, hashed key).
#[async_trait]
pub trait VaultRepositoryTrait: Send + Sync {
    fn get(&self, preset: &str, key_hash: &str) -> Result<Option<Value>>;

    async fn set(&self, preset: &str, key_hash: &str, value: Value) -> Result<()>;

    /// Removes every entry of a preset. Returns the number of removed entries.
    async fn flush(&self, preset: &str) -> Result<usize>;
}
