//! Per-preset key/value scratch storage shared by the steps of an import.

mod vault_service;
mod vault_traits;

pub use vault_service::Vault;
pub use vault_traits::VaultRepositoryTrait;
