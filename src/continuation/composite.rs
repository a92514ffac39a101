//! Composite continuation
//!
//! A split-proof frontier over many sub-ranges, traversed breadth-first.
//!
//! The frontier is a rotation: `current` is the head being read and
//! `pending` holds every other slot in visiting order. Rotating moves the
//! head to the back and promotes the next pending slot, so the head can be
//! updated in place and the rotation can never be empty.

use super::types::{CompositeContinuationToken, NoContent};
use super::wire::CompositeContinuationWire;
use crate::error::{Error, Result};
use crate::range::{PartitionKeyRange, Range};
use crate::routing::RoutingMapProvider;
use crate::types::ShouldRetry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Frontier of per-sub-range read positions for one container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "CompositeContinuationWire",
    into = "CompositeContinuationWire"
)]
pub struct FeedRangeCompositeContinuation {
    /// Container the frontier was built for
    container_id: String,
    /// The range originally requested
    feed_range: Range<String>,
    /// Head of the rotation
    current: CompositeContinuationToken,
    /// Remaining slots in visiting order
    pending: VecDeque<CompositeContinuationToken>,
    /// Range ids drained by a finite read; never shrinks
    done_ranges: BTreeSet<String>,
    /// First range that reported "not modified" in the current pass
    initial_no_results_range: Option<String>,
}

impl FeedRangeCompositeContinuation {
    /// Start a frontier with one slot per range, all seeded with `initial_token`
    pub fn new(
        container_id: impl Into<String>,
        feed_range: Range<String>,
        ranges: &[Range<String>],
        initial_token: Option<String>,
    ) -> Result<Self> {
        let tokens = ranges
            .iter()
            .map(|range| CompositeContinuationToken::new(range, initial_token.clone()))
            .collect();
        Self::from_parts(container_id.into(), feed_range, tokens, BTreeSet::new())
            .map_err(|_| Error::invalid_argument("ranges must not be empty"))
    }

    /// Start a frontier from the partitions a routing lookup returned
    pub fn from_partition_key_ranges(
        container_id: impl Into<String>,
        feed_range: Range<String>,
        ranges: &[PartitionKeyRange],
        initial_token: Option<String>,
    ) -> Result<Self> {
        let ranges: Vec<_> = ranges
            .iter()
            .map(|pkr| clip(&pkr.to_range(), &feed_range))
            .collect();
        Self::new(container_id, feed_range, &ranges, initial_token)
    }

    /// Resume a frontier from previously persisted tokens, order preserved
    pub fn from_tokens(
        container_id: impl Into<String>,
        feed_range: Range<String>,
        tokens: Vec<CompositeContinuationToken>,
    ) -> Result<Self> {
        Self::from_parts(container_id.into(), feed_range, tokens, BTreeSet::new())
    }

    pub(crate) fn from_parts(
        container_id: String,
        feed_range: Range<String>,
        tokens: Vec<CompositeContinuationToken>,
        done_ranges: BTreeSet<String>,
    ) -> Result<Self> {
        let mut pending: VecDeque<_> = tokens.into();
        let current = pending
            .pop_front()
            .ok_or_else(|| Error::invalid_argument("continuation tokens must not be empty"))?;

        Ok(Self {
            container_id,
            feed_range,
            current,
            pending,
            done_ranges,
            initial_no_results_range: None,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Container this frontier belongs to
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// The range originally requested
    pub fn feed_range(&self) -> &Range<String> {
        &self.feed_range
    }

    /// The slot currently being read
    pub fn current_token(&self) -> &CompositeContinuationToken {
        &self.current
    }

    /// Current `(range, token)` to issue the next read with
    pub fn current_position(&self) -> (&Range<String>, Option<&str>) {
        (&self.current.range, self.current.token.as_deref())
    }

    /// Position marker of the current slot
    pub fn continuation(&self) -> Option<&str> {
        self.current.token.as_deref()
    }

    /// All slots in rotation order, head first
    pub fn tokens(&self) -> impl Iterator<Item = &CompositeContinuationToken> {
        std::iter::once(&self.current).chain(self.pending.iter())
    }

    /// Number of slots in the rotation
    pub fn len(&self) -> usize {
        self.pending.len() + 1
    }

    /// Never true; the rotation always holds at least one slot
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Range ids marked done
    pub fn done_ranges(&self) -> &BTreeSet<String> {
        &self.done_ranges
    }

    /// True when every range in the rotation is marked done.
    ///
    /// Only meaningful for finite reads; a change feed never gets here.
    pub fn is_done(&self) -> bool {
        self.tokens()
            .all(|t| self.done_ranges.contains(t.range_id()))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Record a new position for the current slot and move to the next one
    pub fn advance_after_success(&mut self, token: impl Into<String>) {
        self.current.token = Some(token.into());
        self.move_to_next_token();
    }

    /// Mark the current range drained and move on (finite reads only)
    pub fn advance_after_termination(&mut self) {
        self.done_ranges.insert(self.current.range.min.clone());
        self.current.token = None;
        self.move_to_next_token();
    }

    /// Move on to the next slot, keeping the current position
    pub fn skip_current(&mut self) {
        self.move_to_next_token();
    }

    /// Apply the continuation a response returned; `None` terminates the range
    pub fn replace_continuation(&mut self, token: Option<String>) {
        match token {
            Some(token) => self.advance_after_success(token),
            None => self.advance_after_termination(),
        }
    }

    /// Forget the range that started the current stall pass
    pub fn reset_stall_marker(&mut self) {
        self.initial_no_results_range = None;
    }

    /// Record a position for the current slot without moving on
    pub fn record_position(&mut self, token: impl Into<String>) {
        self.current.token = Some(token.into());
    }

    /// Breadth-first handling of a response without new items.
    ///
    /// The first stalled range is remembered and every other slot is polled
    /// once, each recording its etag and rotating with a retry. Once the head
    /// is back at the remembered range the pass is over: no retry, no
    /// rotation. The marker stays until a success or a definitive end, so
    /// later stalls on that head end immediately.
    pub fn handle_no_content(&mut self, response: NoContent) -> ShouldRetry {
        let etag = match response {
            NoContent::DefinitiveEnd => {
                self.reset_stall_marker();
                return ShouldRetry::NoRetry;
            }
            NoContent::NotModified { etag } => etag,
        };

        if self.pending.is_empty() {
            return ShouldRetry::NoRetry;
        }

        match &self.initial_no_results_range {
            None => {
                self.initial_no_results_range = Some(self.current.range.min.clone());
            }
            Some(stalled) if *stalled == self.current.range.min => {
                debug!(
                    "Polled all {} ranges of {} without changes",
                    self.len(),
                    self.container_id
                );
                return ShouldRetry::NoRetry;
            }
            Some(_) => {}
        }

        self.advance_after_success(etag);
        ShouldRetry::Retry
    }

    /// Replace the current range with the partitions it was split into.
    ///
    /// Children inherit the current position marker; the first child takes
    /// over the current slot and the rest join the back of the rotation.
    /// The frontier is untouched unless the lookup succeeds.
    pub async fn handle_split<P>(&mut self, provider: &P) -> Result<ShouldRetry>
    where
        P: RoutingMapProvider + ?Sized,
    {
        let parent = self.current.range.clone();
        let children = provider
            .overlapping_ranges(&self.container_id, &parent, true)
            .await?;
        self.create_child_ranges(&parent, &children)?;
        Ok(ShouldRetry::Retry)
    }

    /// React to a "gone" response; only splits are recoverable here
    pub async fn handle_gone<P>(&mut self, provider: &P, is_split: bool) -> Result<ShouldRetry>
    where
        P: RoutingMapProvider + ?Sized,
    {
        if !is_split {
            return Ok(ShouldRetry::NoRetry);
        }
        self.handle_split(provider).await
    }

    /// Reject use against a different container than the frontier was built for
    pub fn validate_container(&self, container_id: &str) -> Result<()> {
        if !self.container_id.is_empty() && self.container_id != container_id {
            warn!(
                "Continuation for container {} used with container {}",
                self.container_id, container_id
            );
            return Err(Error::invalid_argument(format!(
                "continuation belongs to container '{}', not '{container_id}'",
                self.container_id
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a serialized frontier
    pub fn parse(value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(|e| Error::parse(e.to_string()))
    }

    /// Parse a serialized frontier from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::parse(e.to_string()))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn rotate(&mut self) {
        if let Some(next) = self.pending.pop_front() {
            let previous = std::mem::replace(&mut self.current, next);
            self.pending.push_back(previous);
        }
    }

    fn move_to_next_token(&mut self) {
        self.rotate();

        // Finite reads skip drained ranges instead of re-requesting them
        while !self.is_done() && self.done_ranges.contains(self.current.range_id()) {
            self.rotate();
        }
    }

    fn create_child_ranges(
        &mut self,
        parent: &Range<String>,
        children: &[PartitionKeyRange],
    ) -> Result<()> {
        let Some((first, rest)) = children.split_first() else {
            return Err(Error::out_of_range(format!(
                "Token contains invalid range {}-{}",
                parent.min, parent.max
            )));
        };

        let token = self.current.token.clone();
        self.current.range = clip(&first.to_range(), parent);
        for child in rest {
            self.pending.push_back(CompositeContinuationToken::new(
                &clip(&child.to_range(), parent),
                token.clone(),
            ));
        }

        debug!(
            "Split {} of {} into {} ranges",
            parent,
            self.container_id,
            children.len()
        );
        Ok(())
    }
}

/// Intersect a partition's range with the range a slot was reading
fn clip(child: &Range<String>, bounds: &Range<String>) -> Range<String> {
    let min = child.min.clone().max(bounds.min.clone());
    let max = child.max.clone().min(bounds.max.clone());
    Range::half_open(min, max)
}

impl PartialEq for FeedRangeCompositeContinuation {
    /// Compares persisted state only; the stall marker is transient
    fn eq(&self, other: &Self) -> bool {
        self.container_id == other.container_id
            && self.feed_range == other.feed_range
            && self.current == other.current
            && self.pending == other.pending
            && self.done_ranges == other.done_ranges
    }
}

impl fmt::Display for FeedRangeCompositeContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for FeedRangeCompositeContinuation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
