//! Serialized form of composite continuations
//!
//! ```json
//! {
//!   "version": 1,
//!   "container_id": "coll1",
//!   "range": {"min": "", "max": "FF"},
//!   "continuation": [
//!     {"range": {"min": "", "max": "80"}, "token": "42"},
//!     {"range": {"min": "80", "max": "FF"}, "token": null}
//!   ],
//!   "done": []
//! }
//! ```
//!
//! `continuation` preserves rotation order, head first. Unknown fields are
//! ignored so newer writers stay readable.

use super::composite::FeedRangeCompositeContinuation;
use super::types::CompositeContinuationToken;
use crate::error::{Error, Result};
use crate::range::Range;
use serde::{Deserialize, Serialize};

/// Current layout version
pub const CONTINUATION_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONTINUATION_VERSION
}

fn default_feed_range() -> Range<String> {
    Range::<String>::full()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[doc(hidden)]
pub struct CompositeContinuationWire {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    container_id: String,
    #[serde(default = "default_feed_range")]
    range: Range<String>,
    continuation: Vec<CompositeContinuationToken>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    done: Vec<String>,
}

impl From<FeedRangeCompositeContinuation> for CompositeContinuationWire {
    fn from(value: FeedRangeCompositeContinuation) -> Self {
        Self {
            version: CONTINUATION_VERSION,
            container_id: value.container_id().to_string(),
            range: value.feed_range().clone(),
            continuation: value.tokens().cloned().collect(),
            done: value.done_ranges().iter().cloned().collect(),
        }
    }
}

impl TryFrom<CompositeContinuationWire> for FeedRangeCompositeContinuation {
    type Error = Error;

    fn try_from(wire: CompositeContinuationWire) -> Result<Self> {
        if wire.version > CONTINUATION_VERSION {
            return Err(Error::parse(format!(
                "unsupported continuation version {}",
                wire.version
            )));
        }

        check_rotation(&wire.continuation)?;

        FeedRangeCompositeContinuation::from_parts(
            wire.container_id,
            wire.range,
            wire.continuation,
            wire.done.into_iter().collect(),
        )
    }
}

/// Token ranges must be well-formed and pairwise disjoint
fn check_rotation(tokens: &[CompositeContinuationToken]) -> Result<()> {
    if let Some(token) = tokens.iter().find(|t| t.range.min > t.range.max) {
        return Err(Error::parse(format!(
            "token range {} has min above max",
            token.range
        )));
    }

    let mut ranges: Vec<_> = tokens.iter().map(|t| &t.range).collect();
    ranges.sort_by(|a, b| a.cmp_by_min(b));
    if let Some(pair) = ranges.windows(2).find(|pair| pair[0].overlaps(pair[1])) {
        return Err(Error::parse(format!(
            "token ranges {} and {} overlap",
            pair[0], pair[1]
        )));
    }
    Ok(())
}
