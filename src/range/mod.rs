//! Range module
//!
//! Half-open key intervals and the partition key ranges a container is split into.
//!
//! # Overview
//!
//! - `Range<K>` - an interval over any totally ordered key, with explicit
//!   inclusivity on each bound (default `[min, max)`)
//! - `PartitionKeyRange` - one backend partition: an id plus its
//!   `[min_inclusive, max_exclusive)` slice of the effective key space
//! - `MIN_EFFECTIVE_KEY` / `MAX_EFFECTIVE_KEY` - the sentinels bounding that space

mod types;

pub use types::{PartitionKeyRange, Range, MAX_EFFECTIVE_KEY, MIN_EFFECTIVE_KEY};

#[cfg(test)]
mod tests;
