//! Configuration types for feed definitions
//!
//! A feed definition names the container to read, how to read it and where
//! to start. Definitions are written in YAML or JSON.

use crate::continuation::FeedContinuation;
use crate::error::{Error, Result};
use crate::range::Range;
use crate::types::FeedMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Feed Config
// ============================================================================

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Container to read
    pub container_id: String,

    /// Change feed or finite read feed
    #[serde(default)]
    pub mode: FeedMode,

    /// Starting position
    #[serde(default)]
    pub start_from: StartFrom,

    /// Sub-range of the key space to read
    #[serde(default = "default_range")]
    pub range: Range<String>,

    /// Page size hint passed to the transport
    #[serde(default)]
    pub max_item_count: Option<u32>,

    /// Consecutive splits tolerated within one read
    #[serde(default = "default_max_split_retries")]
    pub max_split_retries: u32,
}

fn default_range() -> Range<String> {
    Range::full()
}

fn default_max_split_retries() -> u32 {
    5
}

/// Where a feed starts reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StartFrom {
    /// From the start of every range
    #[default]
    Beginning,

    /// From a backend position marker, applied to every range
    Token {
        /// Position marker
        token: String,
    },

    /// From a serialized continuation
    Continuation {
        /// Continuation as produced by a previous run
        continuation: String,
    },
}

impl FeedConfig {
    /// Create a config for a container with defaults for everything else
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            mode: FeedMode::default(),
            start_from: StartFrom::default(),
            range: default_range(),
            max_item_count: None,
            max_split_retries: default_max_split_retries(),
        }
    }

    /// Set the feed mode
    #[must_use]
    pub fn with_mode(mut self, mode: FeedMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the starting position
    #[must_use]
    pub fn with_start_from(mut self, start_from: StartFrom) -> Self {
        self.start_from = start_from;
        self
    }

    /// Restrict the feed to a sub-range
    #[must_use]
    pub fn with_range(mut self, range: Range<String>) -> Self {
        self.range = range;
        self
    }

    /// Set the page size hint
    #[must_use]
    pub fn with_max_item_count(mut self, count: u32) -> Self {
        self.max_item_count = Some(count);
        self
    }

    /// Load and validate a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse feed YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse feed JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are JSON, anything else YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read feed config '{}': {e}",
                path.display()
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Check the config is usable
    pub fn validate(&self) -> Result<()> {
        if self.container_id.is_empty() {
            return Err(Error::config("container_id cannot be empty"));
        }

        if self.range.is_empty() || self.range.min > self.range.max {
            return Err(Error::config(format!("range {} is empty", self.range)));
        }

        if self.max_item_count == Some(0) {
            return Err(Error::config("max_item_count must be greater than zero"));
        }

        match &self.start_from {
            StartFrom::Beginning => {}
            StartFrom::Token { token } => {
                if token.is_empty() {
                    return Err(Error::config("start_from token cannot be empty"));
                }
            }
            StartFrom::Continuation { continuation } => {
                let parsed = FeedContinuation::parse(continuation)
                    .map_err(|e| Error::config(format!("Invalid start_from continuation: {e}")))?;
                parsed
                    .validate_container(&self.container_id)
                    .map_err(|e| Error::config(e.to_string()))?;
            }
        }

        Ok(())
    }
}
