//! Errors raised inside the SQLite layer.
//!
//! Repositories work with `StorageError` internally and hand
//! `contentimport_core::Error` to their callers.

use contentimport_core::errors::{DatabaseError, Error};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not open database: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Invalid JSON column: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A writer job failed and its transaction was rolled back.
    #[error("Write rolled back: {0}")]
    RolledBack(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let database_error = match err {
            StorageError::ConnectionFailed(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::PoolError(e) => DatabaseError::PoolCreationFailed(e.to_string()),
            StorageError::QueryFailed(DieselError::NotFound) => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => DatabaseError::UniqueViolation(info.message().to_string()),
            StorageError::QueryFailed(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::MigrationFailed(message) => DatabaseError::MigrationFailed(message),
            StorageError::SerializationError(e) => DatabaseError::Internal(e.to_string()),
            StorageError::RolledBack(message) => DatabaseError::Internal(message),
        };
        Error::Database(database_error)
    }
}
