//! Continuation types
//!
//! Building blocks shared by the continuation variants.

use crate::range::Range;
use serde::{Deserialize, Serialize};

/// One frontier slot: a sub-range and the backend's position within it.
///
/// `token` is opaque; `None` means "start from the beginning of this range"
/// or, once the range is marked done, that it has been drained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeContinuationToken {
    /// The sub-range this slot reads
    pub range: Range<String>,
    /// Backend position marker within the range
    #[serde(default)]
    pub token: Option<String>,
}

impl CompositeContinuationToken {
    /// Create a slot for a range; bounds are normalized to `[min, max)`
    pub fn new(range: &Range<String>, token: Option<String>) -> Self {
        Self {
            range: Range::half_open(range.min.clone(), range.max.clone()),
            token,
        }
    }

    /// The range identifier used for done-tracking and stall detection
    pub fn range_id(&self) -> &str {
        &self.range.min
    }
}

/// A response that carried no new items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoContent {
    /// Success with nothing new; not a stall
    DefinitiveEnd,
    /// The sub-range has nothing newer than `etag`
    NotModified {
        /// Position marker returned with the response
        etag: String,
    },
}

impl NoContent {
    /// Create a not-modified signal
    pub fn not_modified(etag: impl Into<String>) -> Self {
        Self::NotModified { etag: etag.into() }
    }
}
