//! Content importer core - domain models, services, and traits.
//!
//! This crate contains the import logic: data providers, the node importer,
//! the property mapper, checkpoints, the import session and the batch loop.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod batch;
pub mod constants;
pub mod content;
pub mod data_providers;
pub mod data_types;
pub mod errors;
pub mod events;
pub mod importers;
pub mod imports;
pub mod mapping;
pub mod presets;
pub mod record_mappings;
pub mod settings;
pub mod utils;
pub mod vault;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
