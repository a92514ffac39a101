//! Single-range continuation
//!
//! Points at one partition key range by id. It stays that simple until the
//! partition splits, at which point it has to become a composite frontier.

use super::composite::FeedRangeCompositeContinuation;
use super::types::CompositeContinuationToken;
use crate::error::{Error, Result};
use crate::routing::RoutingMapProvider;
use serde::{Deserialize, Serialize};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// A read position inside one partition, addressed by range id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyRangeContinuation {
    /// Container the partition belongs to
    pub container_id: String,
    /// Partition key range id
    pub range_id: String,
    /// Backend position marker
    #[serde(default)]
    pub token: Option<String>,
    /// Whether a finite read drained the partition
    #[serde(default, skip_serializing_if = "is_false")]
    pub done: bool,
}

impl PartitionKeyRangeContinuation {
    /// Create a continuation for a partition
    pub fn new(
        container_id: impl Into<String>,
        range_id: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            range_id: range_id.into(),
            token,
            done: false,
        }
    }

    /// Apply the continuation a response returned; `None` drains the partition
    pub fn replace_continuation(&mut self, token: Option<String>) {
        if token.is_none() {
            self.done = true;
        }
        self.token = token;
    }

    /// Reject use against a different container
    pub fn validate_container(&self, container_id: &str) -> Result<()> {
        if !self.container_id.is_empty() && self.container_id != container_id {
            return Err(Error::invalid_argument(format!(
                "continuation belongs to container '{}', not '{container_id}'",
                self.container_id
            )));
        }
        Ok(())
    }

    /// Expand into a composite frontier covering this partition's bounds.
    ///
    /// Bounds come from the cached snapshot: after a split the fresh routing
    /// map no longer knows the parent id.
    pub async fn to_composite<P>(&self, provider: &P) -> Result<FeedRangeCompositeContinuation>
    where
        P: RoutingMapProvider + ?Sized,
    {
        let partition = provider
            .range_by_id(&self.container_id, &self.range_id, false)
            .await
            .map_err(|e| match e {
                Error::PartitionKeyRangeNotFound { .. } => Error::out_of_range(format!(
                    "partition key range '{}' is not in the routing map",
                    self.range_id
                )),
                other => other,
            })?;

        let range = partition.to_range();
        let token = CompositeContinuationToken::new(&range, self.token.clone());
        FeedRangeCompositeContinuation::from_tokens(self.container_id.clone(), range, vec![token])
    }
}
