//! Routing map providers
//!
//! The lookup service continuations consult when the backend topology changes.

use super::map::RoutingMap;
use crate::error::{Error, Result};
use crate::range::{PartitionKeyRange, Range};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

// ============================================================================
// Provider Trait
// ============================================================================

/// Supplies routing snapshots for containers.
///
/// Implementors only provide `routing_map`; the query methods are answered
/// from whatever snapshot it returns.
#[async_trait]
pub trait RoutingMapProvider: Send + Sync {
    /// Current routing snapshot; `force_refresh` discards any cached copy
    async fn routing_map(&self, container_id: &str, force_refresh: bool)
        -> Result<Arc<RoutingMap>>;

    /// Ranges overlapping `range`, in key order
    async fn overlapping_ranges(
        &self,
        container_id: &str,
        range: &Range<String>,
        force_refresh: bool,
    ) -> Result<Vec<PartitionKeyRange>> {
        let map = self.routing_map(container_id, force_refresh).await?;
        Ok(map.overlapping_ranges(range).into_iter().cloned().collect())
    }

    /// Ranges overlapping any of `ranges`, in key order
    async fn overlapping_ranges_multi(
        &self,
        container_id: &str,
        ranges: &[Range<String>],
        force_refresh: bool,
    ) -> Result<Vec<PartitionKeyRange>> {
        let map = self.routing_map(container_id, force_refresh).await?;
        Ok(map
            .overlapping_ranges_multi(ranges)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// A single range by id
    async fn range_by_id(
        &self,
        container_id: &str,
        range_id: &str,
        force_refresh: bool,
    ) -> Result<PartitionKeyRange> {
        let map = self.routing_map(container_id, force_refresh).await?;
        map.range_by_id(range_id)
            .cloned()
            .ok_or_else(|| Error::range_not_found(container_id, range_id))
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// Where a cache fetches raw partition key ranges from
#[async_trait]
pub trait RoutingMapSource: Send + Sync {
    /// Fetch the current partition key ranges of a container
    async fn fetch_ranges(&self, container_id: &str) -> Result<Vec<PartitionKeyRange>>;
}

// ============================================================================
// Partition Key Range Cache
// ============================================================================

/// Caches one routing snapshot per container.
///
/// Snapshots are shared read-only across every frontier using the cache;
/// a forced refresh replaces the snapshot for later readers.
#[derive(Debug)]
pub struct PartitionKeyRangeCache<S> {
    /// Upstream range source
    source: S,
    /// Cached snapshots by container id
    maps: RwLock<HashMap<String, Arc<RoutingMap>>>,
    /// Number of successful fetches from the source
    fetches: AtomicU64,
}

impl<S: RoutingMapSource> PartitionKeyRangeCache<S> {
    /// Create an empty cache over a source
    pub fn new(source: S) -> Self {
        Self {
            source,
            maps: RwLock::new(HashMap::new()),
            fetches: AtomicU64::new(0),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// How many times the source has been fetched
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Drop the cached snapshot of a container
    pub async fn invalidate(&self, container_id: &str) {
        self.maps.write().await.remove(container_id);
    }

    async fn refresh(&self, container_id: &str) -> Result<Arc<RoutingMap>> {
        let ranges = self.source.fetch_ranges(container_id).await?;
        let map = Arc::new(RoutingMap::try_new(ranges)?);
        self.fetches.fetch_add(1, Ordering::Relaxed);

        debug!(
            "Refreshed routing map for {}: {} ranges",
            container_id,
            map.len()
        );

        self.maps
            .write()
            .await
            .insert(container_id.to_string(), Arc::clone(&map));
        Ok(map)
    }
}

#[async_trait]
impl<S: RoutingMapSource> RoutingMapProvider for PartitionKeyRangeCache<S> {
    async fn routing_map(
        &self,
        container_id: &str,
        force_refresh: bool,
    ) -> Result<Arc<RoutingMap>> {
        if !force_refresh {
            if let Some(map) = self.maps.read().await.get(container_id) {
                return Ok(Arc::clone(map));
            }
        }
        self.refresh(container_id).await
    }
}

// ============================================================================
// In-Memory Source
// ============================================================================

/// Range source backed by memory; ranges can be swapped to simulate splits
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoutingSource {
    containers: Arc<RwLock<HashMap<String, Vec<PartitionKeyRange>>>>,
}

impl InMemoryRoutingSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source seeded with one container
    pub fn with_container(container_id: impl Into<String>, ranges: Vec<PartitionKeyRange>) -> Self {
        let mut containers = HashMap::new();
        containers.insert(container_id.into(), ranges);
        Self {
            containers: Arc::new(RwLock::new(containers)),
        }
    }

    /// Replace the ranges of a container
    pub async fn set_ranges(&self, container_id: &str, ranges: Vec<PartitionKeyRange>) {
        self.containers
            .write()
            .await
            .insert(container_id.to_string(), ranges);
    }
}

#[async_trait]
impl RoutingMapSource for InMemoryRoutingSource {
    async fn fetch_ranges(&self, container_id: &str) -> Result<Vec<PartitionKeyRange>> {
        self.containers
            .read()
            .await
            .get(container_id)
            .cloned()
            .ok_or_else(|| Error::invalid_argument(format!("unknown container '{container_id}'")))
    }
}
