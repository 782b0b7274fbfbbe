//! Error types for relay pagination
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// Boxed underlying cause attached to decode failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for relay pagination
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Validation Errors (caller input)
    // ============================================================================
    #[error("Invalid pagination arguments: {message}")]
    Validation { message: String },

    // ============================================================================
    // Configuration Errors (integration mistakes)
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Data Integrity Errors
    // ============================================================================
    #[error("Could not find id field '{field}' in the fetched row")]
    MissingField { field: String },

    // ============================================================================
    // Cursor Errors
    // ============================================================================
    #[error("Failed to decode cursor {cursor} - error: {message}")]
    Decode {
        cursor: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ============================================================================
    // Service State Errors
    // ============================================================================
    #[error("Pagination service has not been set up")]
    NotConfigured,

    #[error("Pagination service has already been executed")]
    AlreadyExecuted,

    // ============================================================================
    // Query Engine Errors
    // ============================================================================
    #[error("Query engine error: {message}")]
    Engine { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing id field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a decode error without an underlying cause
    pub fn decode(cursor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            cursor: cursor.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a decode error wrapping the underlying parse failure
    pub fn decode_with_source<E>(cursor: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            cursor: cursor.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Check if this error was caused by the caller's input
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Decode { .. })
    }
}

/// Result type alias for relay pagination
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
