//! Feed driver module
//!
//! Read loop over a composite continuation.
//!
//! # Overview
//!
//! The driver module provides:
//! - `FeedTransport` - the backend seam a read goes through
//! - `FeedIterator` - issues reads against the current range and feeds each
//!   outcome back into the frontier until there is something to hand back
//! - `FeedDriverConfig` / `FeedStats` - configuration and counters

mod types;

pub use types::{
    FeedDriverConfig, FeedIteration, FeedPage, FeedRequest, FeedResponse, FeedStats, FeedStatus,
};

use crate::config::{FeedConfig, StartFrom};
use crate::continuation::{FeedContinuation, FeedRangeCompositeContinuation, NoContent};
use crate::error::{Error, Result};
use crate::routing::RoutingMapProvider;
use crate::types::{JsonValue, ShouldRetry};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backend reads addressed by range
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Read one page from a sub-range
    async fn read(&self, request: FeedRequest) -> Result<FeedPage>;
}

/// Iterator over a range-partitioned feed
pub struct FeedIterator {
    /// Frontier being advanced
    continuation: FeedRangeCompositeContinuation,
    /// Backend reads
    transport: Arc<dyn FeedTransport>,
    /// Routing lookups for split resolution
    provider: Arc<dyn RoutingMapProvider>,
    /// Driver configuration
    config: FeedDriverConfig,
    /// Statistics
    stats: FeedStats,
}

impl FeedIterator {
    /// Create an iterator over an existing frontier
    pub fn new(
        continuation: FeedRangeCompositeContinuation,
        transport: Arc<dyn FeedTransport>,
        provider: Arc<dyn RoutingMapProvider>,
    ) -> Self {
        Self {
            continuation,
            transport,
            provider,
            config: FeedDriverConfig::default(),
            stats: FeedStats::default(),
        }
    }

    /// Set driver configuration
    #[must_use]
    pub fn with_config(mut self, config: FeedDriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Build an iterator from a feed config.
    ///
    /// Fresh starts cover every partition overlapping the configured range;
    /// a serialized continuation is resumed as is.
    pub async fn from_config(
        config: &FeedConfig,
        transport: Arc<dyn FeedTransport>,
        provider: Arc<dyn RoutingMapProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let initial_token = match &config.start_from {
            StartFrom::Beginning => None,
            StartFrom::Token { token } => Some(token.clone()),
            StartFrom::Continuation { continuation } => {
                let continuation = FeedContinuation::parse(continuation)?;
                return Self::resume(
                    continuation,
                    &config.container_id,
                    transport,
                    provider,
                    FeedDriverConfig::from(config),
                )
                .await;
            }
        };

        let partitions = provider
            .overlapping_ranges(&config.container_id, &config.range, false)
            .await?;
        let continuation = FeedRangeCompositeContinuation::from_partition_key_ranges(
            config.container_id.clone(),
            config.range.clone(),
            &partitions,
            initial_token,
        )?;

        info!(
            "Starting feed over {} with {} ranges",
            config.container_id,
            continuation.len()
        );
        Ok(Self::new(continuation, transport, provider).with_config(FeedDriverConfig::from(config)))
    }

    /// Resume from a restored continuation of either kind
    pub async fn resume(
        continuation: FeedContinuation,
        container_id: &str,
        transport: Arc<dyn FeedTransport>,
        provider: Arc<dyn RoutingMapProvider>,
        config: FeedDriverConfig,
    ) -> Result<Self> {
        continuation.validate_container(container_id)?;

        let continuation = match continuation {
            FeedContinuation::Composite(composite) => composite,
            FeedContinuation::PartitionKeyRange(partition) => {
                partition.to_composite(provider.as_ref()).await?
            }
        };

        debug!(
            "Resuming feed over {} at {}",
            container_id,
            continuation.current_token().range
        );
        Ok(Self::new(continuation, transport, provider).with_config(config))
    }

    /// The frontier being advanced
    pub fn continuation(&self) -> &FeedRangeCompositeContinuation {
        &self.continuation
    }

    /// Snapshot of the frontier for checkpointing
    pub fn checkpoint(&self) -> FeedContinuation {
        FeedContinuation::Composite(self.continuation.clone())
    }

    /// Get statistics
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Read until there is something to return.
    ///
    /// Splits and stalled ranges are handled here; the caller only sees a
    /// page of items, a full pass without changes or the end of the feed.
    pub async fn read_next(&mut self) -> Result<FeedIteration> {
        self.read_page().await.inspect_err(|e| {
            if e.is_fatal_for_frontier() {
                warn!(
                    "Feed over {} cannot continue from {}: {}",
                    self.continuation.container_id(),
                    self.continuation.current_token().range,
                    e
                );
            } else {
                debug!("Read from {} failed: {}", self.continuation.container_id(), e);
            }
        })
    }

    async fn read_page(&mut self) -> Result<FeedIteration> {
        if self.config.mode.is_finite() && self.continuation.is_done() {
            return self.iteration(FeedStatus::DefinitiveEnd, Vec::new());
        }

        let mut splits = 0;
        loop {
            let (range, token) = self.continuation.current_position();
            let range = range.clone();
            let request = FeedRequest {
                container_id: self.continuation.container_id().to_string(),
                range: range.clone(),
                continuation: token.map(ToString::to_string),
                max_item_count: self.config.max_item_count,
            };

            self.stats.add_request();
            let page = self.transport.read(request).await?;

            match page.response {
                FeedResponse::Success { continuation } => {
                    self.stats.add_items(page.items.len());
                    match continuation {
                        // Change feeds never terminate a range
                        None if !self.config.mode.is_finite() => self.continuation.skip_current(),
                        token => self.continuation.replace_continuation(token),
                    }
                    self.continuation.reset_stall_marker();
                    return self.iteration(FeedStatus::Success, page.items);
                }
                FeedResponse::NotModified { etag } => {
                    let decision = self
                        .continuation
                        .handle_no_content(NoContent::not_modified(etag.clone()));
                    match decision {
                        ShouldRetry::Retry => self.stats.add_retry(),
                        ShouldRetry::NoRetry => {
                            self.continuation.record_position(etag);
                            return self.iteration(FeedStatus::NotModified, Vec::new());
                        }
                    }
                }
                FeedResponse::DefinitiveEnd => {
                    self.continuation.handle_no_content(NoContent::DefinitiveEnd);
                    return self.iteration(FeedStatus::DefinitiveEnd, Vec::new());
                }
                FeedResponse::Gone { is_split: false } => {
                    return Err(Error::gone(format!(
                        "range {range} of {} is gone",
                        self.continuation.container_id()
                    )));
                }
                FeedResponse::Gone { is_split: true } => {
                    splits += 1;
                    if splits > self.config.max_split_retries {
                        return Err(Error::gone(format!(
                            "range {range} of {} still splitting after {} attempts",
                            self.continuation.container_id(),
                            self.config.max_split_retries
                        )));
                    }

                    self.continuation.handle_split(self.provider.as_ref()).await?;
                    self.stats.add_split();
                    self.stats.add_retry();
                    info!(
                        "Range {} of {} split; continuing with {} ranges",
                        range,
                        self.continuation.container_id(),
                        self.continuation.len()
                    );
                }
            }
        }
    }

    /// Iterate until a finite feed is drained or a change feed catches up
    pub fn into_stream(self) -> impl Stream<Item = Result<FeedIteration>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut iterator = state?;
            match iterator.read_next().await {
                Ok(iteration) => {
                    let next = iteration.has_more_results.then_some(iterator);
                    Some((Ok(iteration), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    fn iteration(&self, status: FeedStatus, items: Vec<JsonValue>) -> Result<FeedIteration> {
        let has_more_results = if self.config.mode.is_finite() {
            !self.continuation.is_done()
        } else {
            status == FeedStatus::Success
        };

        Ok(FeedIteration {
            continuation: self.checkpoint().to_json()?,
            items,
            status,
            has_more_results,
        })
    }
}
