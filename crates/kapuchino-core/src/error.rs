//! Core error types for kapuchino-core.
//!
//! This module defines the error hierarchy using thiserror. Every error here
//! is surfaced to the user as a dismissible notice; none is fatal and none is
//! retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kapuchino-core.
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

    /// Photo loading and encoding errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),

    /// Notification scheduling errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
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

    /// Stored value has an unexpected type
    #[error("Value for '{key}' has unexpected type: {message}")]
    TypeMismatch { key: String, message: String },

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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Message is empty after trimming whitespace
    #[error("Message must not be empty")]
    EmptyMessage,
}

/// Photo pipeline errors.
#[derive(Error, Debug)]
pub enum PhotoError {
    /// Picker or transfer failure (the bytes never arrived)
    #[error("Failed to load photo: {0}")]
    Load(String),

    /// The bytes are not a decodable image
    #[error("Failed to decode photo: {0}")]
    Decode(String),

    /// Re-encoding the resized image failed
    #[error("Failed to encode photo: {0}")]
    Encode(String),
}

/// Notification scheduling errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Notifications are not authorized
    #[error("Notification permission not granted")]
    NotAuthorized,

    /// Registration with the backend failed
    #[error("Failed to register '{identifier}': {message}")]
    RegistrationFailed { identifier: String, message: String },
}

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

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => PhotoError::Encode(e.to_string()),
            image::ImageError::IoError(e) => PhotoError::Load(e.to_string()),
            other => PhotoError::Decode(other.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
