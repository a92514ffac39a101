//! Common types used throughout feedrange
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Feed Mode
// ============================================================================

/// How a feed is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    /// Infinite change stream; never done, polls report "not modified"
    #[default]
    ChangeFeed,
    /// Finite ordered read; each range terminates with an empty continuation
    ReadFeed,
}

impl FeedMode {
    /// Whether the feed can ever reach a terminal state
    pub fn is_finite(self) -> bool {
        matches!(self, Self::ReadFeed)
    }
}

// ============================================================================
// Retry Decision
// ============================================================================

/// Control-flow result returned by frontier transitions.
///
/// Not an error: tells the driver whether to immediately re-issue the read
/// or to hand control back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldRetry {
    /// Re-issue the read right away against the (new) current range
    Retry,
    /// Stop looping; yield to the caller
    NoRetry,
}

impl ShouldRetry {
    /// Check if the driver should loop again
    pub fn should_retry(self) -> bool {
        matches!(self, Self::Retry)
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-request detail
    Trace,
    /// Split resolution, stall passes and checkpoints
    Debug,
    /// Feed lifecycle
    #[default]
    Info,
    /// Misuse such as mismatched containers
    Warn,
    /// Errors only
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
