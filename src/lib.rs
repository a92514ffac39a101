// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # feedrange
//!
//! Split-proof continuations for resumable reads over range-partitioned feeds.
//!
//! A feed is read one sub-range at a time. The position of every sub-range
//! lives in a [`FeedRangeCompositeContinuation`], which survives partition
//! splits, walks its ranges breadth-first and serializes to an opaque
//! string callers can persist and hand back later.
//!
//! ## Features
//!
//! - **Composite continuations**: rotation of `(range, token)` slots with
//!   stall detection and done tracking
//! - **Split resolution**: the current range is replaced by its children,
//!   looked up through a [`RoutingMapProvider`]
//! - **Routing maps**: validated partition snapshots answering overlap queries
//! - **Feed driver**: a read loop over any [`FeedTransport`]
//! - **Checkpoints**: file-backed persistence of continuations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedrange::{FeedConfig, FeedIterator, PartitionKeyRangeCache, Result};
//! use std::sync::Arc;
//!
//! async fn run(transport: Arc<dyn feedrange::FeedTransport>) -> Result<()> {
//!     let config = FeedConfig::from_file("feed.yaml")?;
//!     let provider = Arc::new(PartitionKeyRangeCache::new(my_source()));
//!
//!     let mut feed = FeedIterator::from_config(&config, transport, provider).await?;
//!     let page = feed.read_next().await?;
//!     println!("{} items, resume with {}", page.items.len(), page.continuation);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       FeedIterator                        │
//! │   read_next() → FeedIteration     into_stream() → Stream  │
//! └───────────────────────────────────────────────────────────┘
//!                │                               │
//! ┌──────────────┴──────────────┐   ┌────────────┴────────────┐
//! │ FeedRangeCompositeContinu.. │   │      FeedTransport      │
//! │ rotation · stall · split    │   │  (backend, pluggable)   │
//! └──────────────┬──────────────┘   └─────────────────────────┘
//!                │
//! ┌──────────────┴──────────────┐   ┌─────────────────────────┐
//! │     RoutingMapProvider      │───│ PartitionKeyRangeCache  │
//! │  overlapping_ranges(..)     │   │   RoutingMap snapshots  │
//! └─────────────────────────────┘   └─────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for feedrange
pub mod error;

/// Common types and type aliases
pub mod types;

/// Key ranges and partition key ranges
pub mod range;

/// Routing maps and providers
pub mod routing;

/// Composite and single-range continuations
pub mod continuation;

/// Feed read loop
pub mod driver;

/// Checkpoint persistence
pub mod state;

/// Feed configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{FeedConfig, StartFrom};
pub use continuation::{
    CompositeContinuationToken, FeedContinuation, FeedRangeCompositeContinuation, NoContent,
    PartitionKeyRangeContinuation,
};
pub use driver::{FeedIterator, FeedTransport};
pub use range::{PartitionKeyRange, Range};
pub use routing::{PartitionKeyRangeCache, RoutingMap, RoutingMapProvider};
pub use state::CheckpointStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
