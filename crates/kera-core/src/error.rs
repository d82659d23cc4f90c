//! Core error types for kera-core.
//!
//! Validation failures are deterministic and safe to show to the user
//! verbatim. Storage and IO failures are opaque: they are logged and reported
//! with a generic message through [`CoreError::client_message`].

use std::path::PathBuf;
use thiserror::Error;

use crate::date::Date;

/// Core error type for kera-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The habit does not exist or is not owned by the requesting user.
    #[error("habit not found")]
    HabitNotFound,
}

impl CoreError {
    /// Whether the error message may be shown to the caller unchanged.
    pub fn is_client_safe(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::HabitNotFound)
    }

    /// Message suitable for the caller. Internal failures collapse into a
    /// generic message so storage details never leak.
    pub fn client_message(&self) -> String {
        match self {
            CoreError::Validation(err) => err.to_string(),
            CoreError::HabitNotFound => self.to_string(),
            _ => "internal error".to_string(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be turned back into a domain value
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors. Every message here is safe for client display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one day of the week must be specified for tracking")]
    EmptySchedule,

    #[error("tracked days of the week are invalid: unrecognized day specified")]
    InvalidSchedule,

    #[error("title is too short")]
    TitleTooShort,

    #[error("title is too long")]
    TitleTooLong,

    #[error("title is invalid")]
    TitleInvalid,

    #[error("description is too long")]
    DescriptionTooLong,

    #[error("description is invalid")]
    DescriptionInvalid,

    #[error("habit status is invalid")]
    InvalidStatus,

    #[error("invalid year")]
    InvalidYear,

    #[error("invalid month")]
    InvalidMonth,

    #[error("invalid date: expected YYYY-MM-DD")]
    InvalidDate,

    /// The day lies in the future or before the patch window.
    #[error("{date} is outside the editable window of the last {window_days} days")]
    OutOfWindow { date: Date, window_days: u32 },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
