//! Routing module
//!
//! Maps key ranges onto the partitions that currently own them.
//!
//! # Overview
//!
//! - `RoutingMap` - validated snapshot answering "which partitions overlap this range"
//! - `RoutingMapProvider` - async lookup contract continuations resolve splits through
//! - `PartitionKeyRangeCache` - provider that caches one snapshot per container
//! - `InMemoryRoutingSource` - swappable in-memory range source

mod map;
mod provider;

pub use map::{parse_ranges, RoutingMap};
pub use provider::{
    InMemoryRoutingSource, PartitionKeyRangeCache, RoutingMapProvider, RoutingMapSource,
};
