//! Feed continuation
//!
//! The opaque state handed to callers. Variants are told apart by the
//! `kind` field of the serialized form.

use super::composite::FeedRangeCompositeContinuation;
use super::partition::PartitionKeyRangeContinuation;
use crate::error::{Error, Result};
use crate::range::Range;
use crate::routing::RoutingMapProvider;
use crate::types::ShouldRetry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Any resumable read position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedContinuation {
    /// Frontier over one or more sub-ranges
    Composite(FeedRangeCompositeContinuation),
    /// Single partition addressed by id
    PartitionKeyRange(PartitionKeyRangeContinuation),
}

impl FeedContinuation {
    /// Container the continuation belongs to
    pub fn container_id(&self) -> &str {
        match self {
            Self::Composite(c) => c.container_id(),
            Self::PartitionKeyRange(p) => &p.container_id,
        }
    }

    /// Position marker to send with the next read
    pub fn continuation(&self) -> Option<&str> {
        match self {
            Self::Composite(c) => c.continuation(),
            Self::PartitionKeyRange(p) => p.token.as_deref(),
        }
    }

    /// Range of the next read, when addressed by range rather than id
    pub fn current_range(&self) -> Option<&Range<String>> {
        match self {
            Self::Composite(c) => Some(&c.current_token().range),
            Self::PartitionKeyRange(_) => None,
        }
    }

    /// Apply the continuation a response returned
    pub fn replace_continuation(&mut self, token: Option<String>) {
        match self {
            Self::Composite(c) => c.replace_continuation(token),
            Self::PartitionKeyRange(p) => p.replace_continuation(token),
        }
    }

    /// Reject use against a different container
    pub fn validate_container(&self, container_id: &str) -> Result<()> {
        match self {
            Self::Composite(c) => c.validate_container(container_id),
            Self::PartitionKeyRange(p) => p.validate_container(container_id),
        }
    }

    /// Whether a finite read has drained everything
    pub fn is_done(&self) -> bool {
        match self {
            Self::Composite(c) => c.is_done(),
            Self::PartitionKeyRange(p) => p.done,
        }
    }

    /// Resolve a split of the current range.
    ///
    /// A single-partition continuation first becomes a composite over the
    /// partition's bounds; `self` only changes once resolution succeeded.
    pub async fn handle_split<P>(&mut self, provider: &P) -> Result<ShouldRetry>
    where
        P: RoutingMapProvider + ?Sized,
    {
        match self {
            Self::Composite(c) => c.handle_split(provider).await,
            Self::PartitionKeyRange(p) => {
                let mut composite = p.to_composite(provider).await?;
                let decision = composite.handle_split(provider).await?;
                debug!(
                    "Converted partition {} continuation into {} ranges",
                    p.range_id,
                    composite.len()
                );
                *self = Self::Composite(composite);
                Ok(decision)
            }
        }
    }

    /// The composite frontier, if this is one
    pub fn as_composite(&self) -> Option<&FeedRangeCompositeContinuation> {
        match self {
            Self::Composite(c) => Some(c),
            Self::PartitionKeyRange(_) => None,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a serialized continuation
    pub fn parse(value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(|e| Error::parse(e.to_string()))
    }

    /// Parse a serialized continuation from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::parse(e.to_string()))
    }
}

impl From<FeedRangeCompositeContinuation> for FeedContinuation {
    fn from(value: FeedRangeCompositeContinuation) -> Self {
        Self::Composite(value)
    }
}

impl From<PartitionKeyRangeContinuation> for FeedContinuation {
    fn from(value: PartitionKeyRangeContinuation) -> Self {
        Self::PartitionKeyRange(value)
    }
}

impl fmt::Display for FeedContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for FeedContinuation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
