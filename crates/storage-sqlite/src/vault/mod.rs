//! SQLite storage implementation for the import vault.

mod model;
mod repository;

pub use model::VaultEntryDB;
pub use repository::VaultRepository;
