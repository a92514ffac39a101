//! Error types for feedrange
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for feedrange
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // ============================================================================
    // Argument / Validation Errors
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Out of range: {message}")]
    OutOfRange { message: String },

    // ============================================================================
    // Continuation Errors
    // ============================================================================
    #[error("Failed to parse continuation: {message}")]
    Parse { message: String },

    // ============================================================================
    // Routing Errors
    // ============================================================================
    #[error("Incomplete routing map: {message}")]
    IncompleteRoutingMap { message: String },

    #[error("Partition key range '{range_id}' not found in container '{container_id}'")]
    PartitionKeyRangeNotFound {
        container_id: String,
        range_id: String,
    },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Transport error: {message}")]
    Transport { message: String, retryable: bool },

    #[error("Partition gone: {message}")]
    Gone { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

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
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }

    /// Create a continuation parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an incomplete routing map error
    pub fn incomplete_routing_map(message: impl Into<String>) -> Self {
        Self::IncompleteRoutingMap {
            message: message.into(),
        }
    }

    /// Create a range-not-found error
    pub fn range_not_found(container_id: impl Into<String>, range_id: impl Into<String>) -> Self {
        Self::PartitionKeyRangeNotFound {
            container_id: container_id.into(),
            range_id: range_id.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport {
            message: message.into(),
            retryable,
        }
    }

    /// Create a gone error
    pub fn gone(message: impl Into<String>) -> Self {
        Self::Gone {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { retryable, .. } => *retryable,
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Check if this error stops the owning frontier from making progress
    pub fn is_fatal_for_frontier(&self) -> bool {
        matches!(
            self,
            Error::OutOfRange { .. }
                | Error::Parse { .. }
                | Error::InvalidArgument { .. }
                | Error::Gone { .. }
        )
    }
}

/// Result type alias for feedrange
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
