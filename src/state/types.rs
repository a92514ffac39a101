//! Checkpoint types
//!
//! Serialized to JSON and persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every persisted feed position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoints {
    /// Per-feed checkpoint by feed name
    #[serde(default)]
    pub feeds: BTreeMap<String, FeedCheckpoint>,
}

impl Checkpoints {
    /// Create an empty set of checkpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the checkpoint of a feed
    pub fn get(&self, feed: &str) -> Option<&FeedCheckpoint> {
        self.feeds.get(feed)
    }

    /// Record a serialized continuation for a feed
    pub fn set(&mut self, feed: &str, continuation: String) {
        self.feeds.insert(
            feed.to_string(),
            FeedCheckpoint {
                continuation,
                updated_at: Utc::now(),
            },
        );
    }
}

/// Last known position of one feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCheckpoint {
    /// Serialized continuation, kept opaque until restored
    pub continuation: String,
    /// When the checkpoint was written
    pub updated_at: DateTime<Utc>,
}
