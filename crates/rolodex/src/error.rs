//! Error types for rolodex.
//!
//! This module defines the crate-level error type shared by the store, the
//! configuration layer and the CLI. HTTP-facing errors live in
//! [`crate::api::ApiError`], which wraps this type for store faults.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rolodex operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A record with the same unique key already exists in the collection.
    #[error("duplicate {key:?} in collection '{collection}'")]
    Duplicate {
        /// Collection the write targeted.
        collection: &'static str,
        /// The clashing unique key.
        key: String,
    },

    /// An identifier string is not a well-formed record id.
    #[error("malformed record id: {0:?}")]
    MalformedId(String),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rolodex operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a malformed id error for the offending input.
    #[must_use]
    pub fn malformed_id(input: impl Into<String>) -> Self {
        Self::MalformedId(input.into())
    }

    /// Check if this error is a unique-key clash.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Check if this error is a malformed identifier.
    #[must_use]
    pub fn is_malformed_id(&self) -> bool {
        matches!(self, Self::MalformedId(_))
    }
}
