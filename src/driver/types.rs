//! Driver types
//!
//! Request/response shapes exchanged with a transport, plus driver
//! configuration and statistics.

use crate::config::FeedConfig;
use crate::range::Range;
use crate::types::{FeedMode, JsonValue};

// ============================================================================
// Transport Messages
// ============================================================================

/// One read against a sub-range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Container to read
    pub container_id: String,
    /// Sub-range addressed by the read
    pub range: Range<String>,
    /// Position marker to resume from; `None` starts at the beginning
    pub continuation: Option<String>,
    /// Page size hint
    pub max_item_count: Option<u32>,
}

/// Outcome of a read as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResponse {
    /// Items were returned; `None` means the range is drained (read feed)
    Success {
        /// Position after this page
        continuation: Option<String>,
    },
    /// Nothing newer than `etag` in this range
    NotModified {
        /// Position marker to keep polling from
        etag: String,
    },
    /// Nothing new and nothing more to poll
    DefinitiveEnd,
    /// The addressed range no longer exists
    Gone {
        /// Whether the range was split into children
        is_split: bool,
    },
}

/// A page returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    /// What happened
    pub response: FeedResponse,
    /// Items of the page; empty unless the response is a success
    pub items: Vec<JsonValue>,
}

impl FeedPage {
    /// A page of items
    pub fn success(continuation: Option<String>, items: Vec<JsonValue>) -> Self {
        Self {
            response: FeedResponse::Success { continuation },
            items,
        }
    }

    /// A "not modified" page
    pub fn not_modified(etag: impl Into<String>) -> Self {
        Self {
            response: FeedResponse::NotModified { etag: etag.into() },
            items: Vec::new(),
        }
    }

    /// A definitive end of the feed
    pub fn definitive_end() -> Self {
        Self {
            response: FeedResponse::DefinitiveEnd,
            items: Vec::new(),
        }
    }

    /// A "gone" page
    pub fn gone(is_split: bool) -> Self {
        Self {
            response: FeedResponse::Gone { is_split },
            items: Vec::new(),
        }
    }
}

// ============================================================================
// Iteration Results
// ============================================================================

/// How a `read_next` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// A page of items was read
    Success,
    /// Every range was polled once without changes
    NotModified,
    /// The backend has nothing more, or a finite feed is already drained
    DefinitiveEnd,
}

/// Result of one `read_next` call
#[derive(Debug, Clone, PartialEq)]
pub struct FeedIteration {
    /// Serialized continuation after the step
    pub continuation: String,
    /// Items read
    pub items: Vec<JsonValue>,
    /// How the step ended
    pub status: FeedStatus,
    /// Whether calling `read_next` again is expected to make progress
    pub has_more_results: bool,
}

// ============================================================================
// Driver Configuration
// ============================================================================

/// Configuration for a feed iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDriverConfig {
    /// Change feed or finite read feed
    pub mode: FeedMode,
    /// Page size hint passed to the transport
    pub max_item_count: Option<u32>,
    /// Consecutive splits tolerated within one `read_next`
    pub max_split_retries: u32,
}

impl Default for FeedDriverConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::ChangeFeed,
            max_item_count: None,
            max_split_retries: 5,
        }
    }
}

impl FeedDriverConfig {
    /// Create a driver config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feed mode
    #[must_use]
    pub fn with_mode(mut self, mode: FeedMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the page size hint
    #[must_use]
    pub fn with_max_item_count(mut self, count: u32) -> Self {
        self.max_item_count = Some(count);
        self
    }

    /// Set the split retry bound
    #[must_use]
    pub fn with_max_split_retries(mut self, retries: u32) -> Self {
        self.max_split_retries = retries;
        self
    }
}

impl From<&FeedConfig> for FeedDriverConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            mode: config.mode,
            max_item_count: config.max_item_count,
            max_split_retries: config.max_split_retries,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters kept by a feed iterator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Reads issued to the transport
    pub requests: usize,
    /// Reads re-issued without returning to the caller
    pub retries: usize,
    /// Splits resolved
    pub splits: usize,
    /// Items returned
    pub items: usize,
}

impl FeedStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request
    pub fn add_request(&mut self) {
        self.requests += 1;
    }

    /// Add a retry
    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    /// Add a split
    pub fn add_split(&mut self) {
        self.splits += 1;
    }

    /// Add items
    pub fn add_items(&mut self, count: usize) {
        self.items += count;
    }
}
