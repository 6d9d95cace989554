//! SQLite storage implementation for the content importer.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `contentimport-core` and contains:
//! - Database connection pooling and the single writer
//! - Diesel migrations
//! - Repository implementations for import runs, audit events, checkpoints,
//!   the content tree and the vault
//!
//! # Architecture
//!
//! ```text
//!        core (import logic)
//!               │
//!               ▼
//!   storage-sqlite (this crate)
//!               │
//!               ▼
//!           SQLite DB
//! ```

pub mod db;
pub mod environment;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod content;
pub mod events;
pub mod imports;
pub mod record_mappings;
pub mod vault;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};

pub use environment::SqliteEnvironmentFactory;

// Re-export storage errors
pub use errors::StorageError;

// Re-export from contentimport-core for convenience
pub use contentimport_core::errors::{DatabaseError, Error, Result};
