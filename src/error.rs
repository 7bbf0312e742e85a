//! Error types for healthtrack
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors with clear error chains.
//!
//! Only mechanism failures live here. Expected negative results of a
//! workflow (taken usernames, bad credentials, unknown exercises) are
//! returned as outcome enums by the services, never raised.

use std::io;

/// Main error type for the healthtrack crate
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dashboard aggregation errors
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Database operation errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The session has never been connected (or was reset)
    #[error("Database is not connected")]
    NotConnected,

    /// Credentials rejected or the server could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// The store answered with a shape we cannot read
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// A procedure name that is not a plain SQL identifier
    #[error("Invalid procedure name: {0}")]
    InvalidProcedure(String),
}

/// Configuration loading/parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file could not be read
    #[error("Failed to read configuration: {0}")]
    Read(#[from] io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while reshaping chart rows
///
/// Distinct from an empty result: no rows is a valid "no data" summary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    /// A required column is absent from the result
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    /// A row is shorter than the column list
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A date cell could not be read as a date
    #[error("Row {row}: unreadable date in column '{column}'")]
    InvalidDate { row: usize, column: &'static str },

    /// A numeric cell held something other than a number
    #[error("Row {row}: non-numeric value in column '{column}'")]
    NotNumeric { row: usize, column: &'static str },

    /// A required value was NULL
    #[error("Row {row}: NULL in column '{column}'")]
    NullValue { row: usize, column: &'static str },
}

/// Specialized Result type for healthtrack operations
pub type Result<T> = std::result::Result<T, HealthError>;

/// Specialized Result type for database operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for aggregation
pub type AggregationResult<T> = std::result::Result<T, AggregationError>;

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        DbError::QueryFailed(err.to_string())
    }
}
