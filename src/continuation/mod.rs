//! Continuation module
//!
//! Resumable read positions over range-partitioned feeds.
//!
//! # Overview
//!
//! - `FeedRangeCompositeContinuation` - an ordered rotation of
//!   `(range, token)` slots that survives partition splits and walks its
//!   sub-ranges breadth-first
//! - `PartitionKeyRangeContinuation` - a position inside a single partition
//! - `FeedContinuation` - either of the above, tagged by `kind` when serialized
//!
//! Transitions are synchronous except split resolution, which awaits the
//! routing lookup before touching any state.

mod composite;
mod feed;
mod partition;
mod types;
mod wire;

pub use composite::FeedRangeCompositeContinuation;
pub use feed::FeedContinuation;
pub use partition::PartitionKeyRangeContinuation;
pub use types::{CompositeContinuationToken, NoContent};
pub use wire::CONTINUATION_VERSION;
