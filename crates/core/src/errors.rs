//! Core error types for the content importer.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the importer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Import session error: {0}")]
    Import(#[from] ImportError),

    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Batch step failed: {0}")]
    Step(#[from] StepExecutionError),

    #[error("Data provider error: {0}")]
    DataProvider(#[from] DataProviderError),

    #[error("Data type conversion failed: {0}")]
    DataType(#[from] DataTypeError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Failed retrieving existing node for update. External identifier: {external_id} Node identifier: {node_id}. \
         The record mapping does not match the imported nodes anymore."
    )]
    RecordMappingNotFound {
        external_id: String,
        node_id: String,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised by the import session state machine.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unable to start a new import, please stop the current import first")]
    AlreadyRunning,

    #[error("No import is running, please start an import first")]
    NotRunning,

    #[error(
        "An import referring to the external identifier \"{external_run_id}\" has already been executed on {}",
        started_at.format("%d.%m.%Y %H:%M:%S")
    )]
    DuplicateRun {
        external_run_id: String,
        started_at: DateTime<Utc>,
    },

    #[error("This import has ended earlier")]
    AlreadyEnded,

    #[error("Last import is not set")]
    LastImportNotSet,

    #[error("Import run {0} not found")]
    RunNotFound(String),
}

/// Errors in preset settings; always fatal before any work starts.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Preset \"{0}\" not found")]
    PresetNotFound(String),

    #[error("No parts found for import preset \"{0}\"")]
    MissingParts(String),

    #[error("Part \"{part}\" not found in preset \"{preset}\"")]
    PartNotFound { preset: String, part: String },

    #[error("Missing or invalid \"{option}\" in {context}")]
    MissingOption { option: String, context: String },

    #[error("Unknown data provider type \"{0}\"")]
    UnknownDataProvider(String),

    #[error("Unknown importer type \"{0}\"")]
    UnknownImporter(String),

    #[error("Unknown node type \"{0}\"")]
    UnknownNodeType(String),

    #[error("Unknown dimension preset \"{0}\"")]
    UnknownDimensionPreset(String),

    #[error("Failed to read settings file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

/// Errors raised while running or supervising a single batch step.
#[derive(Error, Debug)]
pub enum StepExecutionError {
    #[error("Sub command failed with status {0}")]
    SubCommandFailed(i32),

    #[error("Sub command was terminated by a signal")]
    Terminated,

    #[error("Sub command returned invalid output: {0:?}")]
    InvalidOutput(String),

    #[error("Failed to spawn sub command: {0}")]
    Spawn(String),
}

/// Errors raised by data providers while fetching records.
#[derive(Error, Debug)]
pub enum DataProviderError {
    #[error("File \"{0}\" not found")]
    FileNotFound(String),

    #[error("Failed to read CSV: {0}")]
    Csv(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unknown source \"{0}\"")]
    UnknownSource(String),

    #[error("Could not determine {what} from record data (key: {key})")]
    MissingRecordField { what: String, key: String },
}

/// Errors raised by data type conversions.
#[derive(Error, Debug)]
pub enum DataTypeError {
    #[error("Cannot convert {0} to a date")]
    InvalidDate(String),

    #[error("Invalid external resource: {0}")]
    InvalidResource(String),

    #[error("Download of {uri} failed: {message}")]
    Download { uri: String, message: String },

    #[error("Invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Invalid input that does not fit a more specific category.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Shorthand for a missing or invalid option.
    pub fn missing_option(option: impl Into<String>, context: impl Into<String>) -> Self {
        Error::Configuration(ConfigurationError::MissingOption {
            option: option.into(),
            context: context.into(),
        })
    }
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::DataProvider(DataProviderError::Csv(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DataProvider(DataProviderError::Query(err.to_string()))
    }
}
