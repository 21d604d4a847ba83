//! Error types for the propbind library

use std::time::Duration;
use thiserror::Error;

/// Result type alias for propbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the propbind library
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Load Errors
    // -------------------------------------------------------------------------
    #[error("Source '{name}' is unreachable: {source}")]
    SourceUnreachable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed source '{name}' at line {line}: {reason}")]
    MalformedSource {
        name: String,
        line: usize,
        reason: String,
    },

    #[error("Loading timed out after {waited:?}")]
    LoadTimeout { waited: Duration },

    // -------------------------------------------------------------------------
    // Conversion Errors
    // -------------------------------------------------------------------------
    #[error("Cannot convert '{raw}' to {target}: {reason}")]
    Conversion {
        raw: String,
        target: String,
        reason: String,
    },

    #[error("Converter '{0}' is registered more than once")]
    AmbiguousConversionRule(String),

    #[error("Converter '{0}' is not registered")]
    UnknownConverter(String),

    // -------------------------------------------------------------------------
    // Binding Errors
    // -------------------------------------------------------------------------
    #[error("Missing required property '{0}'")]
    MissingRequiredProperty(String),

    #[error("Accessor '{0}' is not registered on this surface")]
    AccessorNotRegistered(String),

    #[error("Accessor '{0}' is declared more than once")]
    DuplicateAccessor(String),

    // -------------------------------------------------------------------------
    // Formatting Errors
    // -------------------------------------------------------------------------
    #[error("Cannot format pattern '{pattern}': {reason}")]
    Format { pattern: String, reason: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to deserialize converted value: {0}")]
    Deserialize(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Failed to spawn background worker: {0}")]
    Worker(#[source] std::io::Error),
}

impl Error {
    /// Check if this error came from loading a backing source.
    ///
    /// Load errors are recovered by the reload coordinator: the previously
    /// published snapshot stays authoritative and readers are unaffected.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::SourceUnreachable { .. }
                | Error::MalformedSource { .. }
                | Error::LoadTimeout { .. }
        )
    }

    /// Check if this error signals an absent property rather than a bad one
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Error::MissingRequiredProperty(_))
    }
}
